//! # Logging
//!
//! Installs the `log` backend for the current platform.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are ignored.
///
/// Natively this is `env_logger`, filtered by `RUST_LOG` and defaulting to `info`. In the browser
/// records go to the console and panics are reported there too.
pub fn init_logging() {
    INIT.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut builder = env_logger::Builder::new();
            match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(log::LevelFilter::Info);
                }
            }
            if builder.try_init().is_err() {
                return;
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            if console_log::init_with_level(log::Level::Info).is_err() {
                return;
            }
        }

        log::debug!("logging initialized");
    });
}
