//! hogar-bambi-init
//!
//! Binario `bambi-init`: crea las colecciones de la app de nutrición de Hogar
//! Bambi y carga los datos semilla.
//!
//! - `cli`: comandos y flags (clap).
//! - `config`: resolución de base destino y backend.
//! - `app`: ejecución de un comando.
//! - `errors`: error de aplicación y códigos de salida.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
