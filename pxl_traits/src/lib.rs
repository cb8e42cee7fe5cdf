use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common pxl Error type.
#[derive(Debug, Clone, PartialEq)]
pub struct PxError {
    message: String,
    cause: Option<String>,
}

impl Display for PxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cause_str = match &self.cause {
            Some(c) => c.to_string(),
            None => "None".to_string(),
        };
        write!(f, "{}\n   cause:{}", self.message, cause_str)?;
        Ok(())
    }
}

impl Error for PxError {}

impl From<&str> for PxError {
    fn from(s: &str) -> PxError {
        PxError {
            message: s.to_string(),
            cause: None,
        }
    }
}

impl From<String> for PxError {
    fn from(s: String) -> PxError {
        PxError {
            message: s,
            cause: None,
        }
    }
}

impl PxError {
    pub fn new_with_cause(message: &str, cause: impl Error) -> PxError {
        PxError {
            message: message.to_string(),
            cause: Some(cause.to_string()),
        }
    }

    /// Adds context to the cause. An existing cause is kept after the new one.
    pub fn add_cause(mut self, cause: &str) -> PxError {
        self.cause = Some(match self.cause.take() {
            Some(inner) => format!("{}: {}", cause, inner),
            None => cause.into(),
        });
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

// Generic Result type for pxl.
pub type PxResult<T> = Result<T, PxError>;

/// Read side of a pixel stream: pull one element at a time.
///
/// `pull` suspends the caller until an element is available.
/// A stream that is closed and drained reports an error: from the stage point of view
/// it can never deliver the rest of the frame.
pub trait PixelSource<T> {
    fn pull(&mut self) -> PxResult<T>;
}

/// Write side of a pixel stream: push one element at a time.
///
/// `push` suspends the caller while the stream has no capacity left.
/// A stream whose consumer is gone reports an error.
pub trait PixelSink<T> {
    fn push(&mut self, element: T) -> PxResult<()>;
}

/// An in-memory stream: it is closed from the start, so an empty deque is the end of the stream.
impl<T> PixelSource<T> for VecDeque<T> {
    fn pull(&mut self) -> PxResult<T> {
        self.pop_front()
            .ok_or_else(|| PxError::from("Pixel source exhausted."))
    }
}

/// An unbounded in-memory sink, it never applies backpressure.
impl<T> PixelSink<T> for Vec<T> {
    fn push(&mut self, element: T) -> PxResult<()> {
        Vec::push(self, element);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_with_cause() {
        let err = PxError::from("Failed to read configuration file").add_cause("not found");
        assert_eq!(err.message(), "Failed to read configuration file");
        assert_eq!(err.cause(), Some("not found"));
        assert_eq!(
            err.to_string(),
            "Failed to read configuration file\n   cause:not found"
        );
    }

    #[test]
    fn test_error_causes_chain() {
        let err = PxError::from("Queue closed.")
            .add_cause("after 3 elements")
            .add_cause("stage thr frame #0");
        assert_eq!(err.message(), "Queue closed.");
        assert_eq!(err.cause(), Some("stage thr frame #0: after 3 elements"));
    }

    #[test]
    fn test_error_new_with_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = PxError::new_with_cause("Could not write frame", io);
        assert_eq!(err.cause(), Some("disk on fire"));
    }

    #[test]
    fn test_vecdeque_source_drains_in_order() {
        let mut source: VecDeque<u8> = VecDeque::from(vec![1, 2, 3]);
        assert_eq!(source.pull().unwrap(), 1);
        assert_eq!(source.pull().unwrap(), 2);
        assert_eq!(source.pull().unwrap(), 3);
        assert!(source.pull().is_err());
    }

    #[test]
    fn test_vec_sink_appends() {
        let mut sink: Vec<u8> = Vec::new();
        PixelSink::push(&mut sink, 4).unwrap();
        PixelSink::push(&mut sink, 5).unwrap();
        assert_eq!(sink, vec![4, 5]);
    }
}
