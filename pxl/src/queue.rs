//! Bounded blocking FIFO carrying elements between two pipeline threads.
//!
//! Backpressure policy: a writer blocks as long as `capacity` elements are waiting to be read.
//! A capacity of 0 makes the queue a rendezvous: every push waits for its matching pull.

use pxl_traits::{PixelSink, PixelSource, PxError, PxResult};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};

/// Create a bounded queue, returns the writing and the reading ends.
pub fn px_queue<T>(capacity: usize) -> (QueueWriter<T>, QueueReader<T>) {
    let (tx, rx) = sync_channel(capacity);
    (QueueWriter { tx, capacity }, QueueReader { rx })
}

/// Writing end of a queue. Clones write into the same queue.
/// The queue closes when every writer is dropped.
#[derive(Debug)]
pub struct QueueWriter<T> {
    tx: SyncSender<T>,
    capacity: usize,
}

impl<T> Clone for QueueWriter<T> {
    fn clone(&self) -> Self {
        QueueWriter {
            tx: self.tx.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> QueueWriter<T> {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks while the queue is full.
    pub fn send(&self, element: T) -> PxResult<()> {
        self.tx
            .send(element)
            .map_err(|_| PxError::from("Queue reader is gone, cannot push element."))
    }
}

impl<T> PixelSink<T> for QueueWriter<T> {
    fn push(&mut self, element: T) -> PxResult<()> {
        self.send(element)
    }
}

/// Reading end of a queue.
#[derive(Debug)]
pub struct QueueReader<T> {
    rx: Receiver<T>,
}

impl<T> QueueReader<T> {
    /// Blocks until an element is available.
    /// Returns None once the queue is closed and drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Non blocking variant of recv.
    /// Ok(None) means nothing is queued right now, an error means the queue is closed and drained.
    pub fn try_recv(&self) -> PxResult<Option<T>> {
        match self.rx.try_recv() {
            Ok(element) => Ok(Some(element)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err("Queue closed.".into()),
        }
    }
}

impl<T> PixelSource<T> for QueueReader<T> {
    fn pull(&mut self) -> PxResult<T> {
        self.recv()
            .ok_or_else(|| PxError::from("Queue closed before the end of the frame."))
    }
}

/// Drains the queue until it closes.
impl<T> Iterator for QueueReader<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let (mut tx, mut rx) = px_queue::<u32>(4);
        for i in 0..4 {
            tx.push(i).unwrap();
        }
        for i in 0..4 {
            assert_eq!(rx.pull().unwrap(), i);
        }
    }

    #[test]
    fn test_closed_queue() {
        let (tx, mut rx) = px_queue::<u32>(4);
        tx.send(7).unwrap();
        drop(tx);
        // what was queued before the close is still delivered
        assert_eq!(rx.pull().unwrap(), 7);
        assert!(rx.pull().is_err());
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_writer_fails_without_reader() {
        let (mut tx, rx) = px_queue::<u32>(4);
        drop(rx);
        assert!(tx.push(1).is_err());
    }

    #[test]
    fn test_try_recv() {
        let (tx, rx) = px_queue::<u32>(1);
        assert_eq!(rx.try_recv().unwrap(), None);
        tx.send(3).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Some(3));
        drop(tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_backpressure_blocks_writer() {
        let (tx, rx) = px_queue::<u32>(2);
        assert_eq!(tx.capacity(), 2);
        let producer = thread::spawn(move || {
            for i in 0..10 {
                tx.send(i).unwrap();
            }
        });
        // give the producer time to fill the queue, it must stall on the 3rd element
        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());
        let received: Vec<u32> = rx.collect();
        assert_eq!(received, (0..10).collect::<Vec<_>>());
        producer.join().unwrap();
    }

    #[test]
    fn test_rendezvous() {
        let (tx, rx) = px_queue::<u32>(0);
        let producer = thread::spawn(move || {
            tx.send(42).unwrap();
        });
        assert_eq!(rx.recv(), Some(42));
        producer.join().unwrap();
    }
}
