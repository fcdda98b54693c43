//! Single-use hand-off of a render result from a pool thread to its requester.
//!
//! The requester may block on the result or await it; avoids pulling an async runtime into the
//! render path.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Condvar, Mutex},
    task::{Context, Poll, Waker},
};

/// Create a linked completer / pending pair.
pub fn slot<T>() -> (Completer<T>, Pending<T>) {
    let shared = Arc::new(Shared {
        state: Mutex::new(Slot::Empty),
        filled: Condvar::new(),
    });
    (
        Completer {
            shared: Some(shared.clone()),
        },
        Pending { shared },
    )
}

/// Why a pending result will never arrive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Abandoned {
    /// The completer went away without producing a value.
    Dropped,
    /// A thread panicked while holding the slot.
    Poisoned,
}

impl std::fmt::Display for Abandoned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Abandoned::Dropped => write!(f, "render abandoned before completion"),
            Abandoned::Poisoned => write!(f, "render result lock poisoned"),
        }
    }
}

enum Slot<T> {
    Empty,
    Waiting(Waker),
    Filled(T),
    Taken,
    Abandoned,
}

struct Shared<T> {
    state: Mutex<Slot<T>>,
    filled: Condvar,
}

impl<T> Shared<T> {
    /// Moves the slot to `next`, waking whoever is waiting on it.
    fn settle(&self, next: Slot<T>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Slot::Filled(_) | Slot::Taken = *state {
            return;
        }
        if let Slot::Waiting(waker) = std::mem::replace(&mut *state, next) {
            waker.wake();
        }
        self.filled.notify_all();
    }
}

/// Producer side: fills the slot exactly once.
pub struct Completer<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Completer<T> {
    pub fn complete(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Slot::Filled(value));
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.settle(Slot::Abandoned);
        }
    }
}

/// Consumer side: resolves once the completer fills or drops the slot.
pub struct Pending<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Pending<T> {
    /// Block the current thread until the result is available.
    pub fn wait(self) -> Result<T, Abandoned> {
        let mut state = self.shared.state.lock().map_err(|_| Abandoned::Poisoned)?;
        loop {
            match std::mem::replace(&mut *state, Slot::Taken) {
                Slot::Filled(v) => return Ok(v),
                Slot::Abandoned | Slot::Taken => return Err(Abandoned::Dropped),
                pending => *state = pending,
            }
            state = self
                .shared
                .filled
                .wait(state)
                .map_err(|_| Abandoned::Poisoned)?;
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, Abandoned>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Ok(mut state) = self.shared.state.lock() else {
            return Poll::Ready(Err(Abandoned::Poisoned));
        };
        match std::mem::replace(&mut *state, Slot::Taken) {
            Slot::Filled(v) => Poll::Ready(Ok(v)),
            Slot::Abandoned | Slot::Taken => Poll::Ready(Err(Abandoned::Dropped)),
            Slot::Empty | Slot::Waiting(_) => {
                *state = Slot::Waiting(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_sent_before_wait() {
        let (tx, rx) = slot();
        tx.complete(7);
        assert_eq!(rx.wait(), Ok(7));
    }

    #[test]
    fn value_sent_from_another_thread() {
        let (tx, rx) = slot();
        let handle = std::thread::spawn(move || tx.complete("frame"));
        assert_eq!(rx.wait(), Ok("frame"));
        handle.join().unwrap();
    }

    #[test]
    fn dropped_completer_abandons() {
        let (tx, rx) = slot::<u8>();
        drop(tx);
        assert_eq!(rx.wait(), Err(Abandoned::Dropped));
    }

    #[test]
    fn dropped_completer_wakes_blocked_waiter() {
        let (tx, rx) = slot::<u8>();
        let waiter = std::thread::spawn(move || rx.wait());
        std::thread::sleep(std::time::Duration::from_millis(10));
        drop(tx);
        assert_eq!(waiter.join().unwrap(), Err(Abandoned::Dropped));
    }

    #[tokio::test]
    async fn awaits_value() {
        let (tx, rx) = slot();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            tx.complete(vec![1u8, 2, 3]);
        });
        assert_eq!(rx.await, Ok(vec![1u8, 2, 3]));
    }
}
