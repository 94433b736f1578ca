//! Logging integration.
//!
//! With the `tracing` feature (on by default) an [`Error`](crate::Error) can
//! emit itself as a structured event: the plain message becomes the event
//! message and the code, immutability flag and rendered fields are recorded
//! as event fields.

/// `tracing::trace!` that compiles away without the `tracing` feature.
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*)
    };
}

/// `tracing::debug!` that compiles away without the `tracing` feature.
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*)
    };
}

#[cfg(feature = "tracing")]
mod event {
    use tracing::Level;

    use crate::error::Error;

    impl Error {
        /// Emit the error as an `ERROR` event.
        pub fn log(&self) {
            self.log_at(Level::ERROR);
        }

        /// Emit the error as an event at `level`.
        pub fn log_at(&self, level: Level) {
            let code = self.code();
            let immutable = self.is_immutable();
            let fields = self.fields_string();
            if level == Level::ERROR {
                tracing::error!(code, immutable, fields = %fields, "{}", self);
            } else if level == Level::WARN {
                tracing::warn!(code, immutable, fields = %fields, "{}", self);
            } else if level == Level::INFO {
                tracing::info!(code, immutable, fields = %fields, "{}", self);
            } else if level == Level::DEBUG {
                tracing::debug!(code, immutable, fields = %fields, "{}", self);
            } else {
                tracing::trace!(code, immutable, fields = %fields, "{}", self);
            }
        }
    }
}
