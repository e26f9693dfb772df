#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::sync::Arc;

use clap::Parser;
use image_toolkit::{Cli, DatasetBackend, ImageToolkitApp, MemoryBackend, Startup};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let backend = match Cli::parse().startup() {
        Startup::Folder(folder) => {
            let backend = MemoryBackend::default();
            if let Err(err) = futures::executor::block_on(backend.open_folder(folder.clone())) {
                log::error!("Failed to open {}: {err}", folder.display());
            }
            backend
        }
        Startup::Images(images) => MemoryBackend::with_images(images),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Image Toolkit")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Image Toolkit",
        native_options,
        Box::new(move |cc| Ok(Box::new(ImageToolkitApp::new(cc, Arc::new(backend))))),
    )
}
