use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

enum LoadCommand {
    Load(PathBuf),
    Stop,
}

/// Decodes texture images off the event thread. Results are drained once
/// per frame; a failed decode leaves the previously bound texture in place
/// and only records the error.
pub struct TextureLoader {
    tx_cmd: Sender<LoadCommand>,
    rx_result: Receiver<image::RgbaImage>,
    last_error: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<LoadCommand>();
        let (tx_result, rx_result) = channel::bounded::<image::RgbaImage>(2);
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);

        let thread_handle = thread::spawn(move || {
            loader_thread(rx_cmd, tx_result, last_error_clone);
        });

        Self {
            tx_cmd,
            rx_result,
            last_error,
            thread_handle: Some(thread_handle),
        }
    }

    pub fn load(&self, path: PathBuf) {
        let _ = self.tx_cmd.send(LoadCommand::Load(path));
    }

    pub fn try_recv(&self) -> Option<image::RgbaImage> {
        self.rx_result.try_recv().ok()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn loader_thread(
    rx_cmd: Receiver<LoadCommand>,
    tx_result: Sender<image::RgbaImage>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            LoadCommand::Load(path) => {
                *last_error.lock() = None;

                match decode(&path) {
                    Ok(img) => {
                        log::info!(
                            "loaded texture {} ({}x{})",
                            path.display(),
                            img.width(),
                            img.height()
                        );
                        let _ = tx_result.send(img);
                    }
                    Err(e) => {
                        log::warn!("failed to load texture {}: {e}", path.display());
                        *last_error.lock() = Some(e);
                    }
                }
            }
            LoadCommand::Stop => return,
        }
    }
}

fn decode(path: &Path) -> Result<image::RgbaImage, String> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())?;
    let img = reader.decode().map_err(|e| e.to_string())?;
    Ok(img.to_rgba8())
}
