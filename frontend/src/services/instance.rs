//! Per-widget identity.
//!
//! Each drop target owns a [`DropAreaInstance`]: its options and the right
//! to draw the single status indicator. Starting an operation takes that
//! right over; an older operation keeps running but may no longer touch
//! the indicator.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::DropAreaOptions;

static NEXT_INSTANCE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity and configuration of one drop target.
#[derive(Debug)]
pub struct DropAreaInstance {
    id: u32,
    options: Rc<DropAreaOptions>,
    next_operation: Cell<u32>,
    current: Cell<Option<u32>>,
}

impl DropAreaInstance {
    pub fn new(options: DropAreaOptions) -> Self {
        Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            options: Rc::new(options),
            next_operation: Cell::new(1),
            current: Cell::new(None),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn options(&self) -> Rc<DropAreaOptions> {
        self.options.clone()
    }

    /// Register a new operation; it now owns the status indicator.
    pub fn begin_operation(&self) -> u32 {
        let seq = self.next_operation.get();
        self.next_operation.set(seq.wrapping_add(1));
        self.current.set(Some(seq));
        seq
    }

    /// Whether `seq` still owns the status indicator.
    pub fn owns_indicator(&self, seq: u32) -> bool {
        self.current.get() == Some(seq)
    }

    /// Give the indicator up. Returns true when `seq` held it, meaning its
    /// status bar is the one on screen and must be hidden. No effect when
    /// a newer operation took it.
    pub fn release(&self, seq: u32) -> bool {
        let owned = self.owns_indicator(seq);
        if owned {
            self.current.set(None);
        }
        owned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::I18n;
    use crate::services::{transfer_channel, TransferSignal};
    use crate::types::{CandidateFile, UploadEvent};
    use futures::executor::block_on;

    #[test]
    fn test_instances_are_independent() {
        let a = DropAreaInstance::new(DropAreaOptions {
            url: "/a".into(),
            ..Default::default()
        });
        let b = DropAreaInstance::new(DropAreaOptions {
            url: "/b".into(),
            ..Default::default()
        });

        assert_ne!(a.id(), b.id());
        assert_eq!(a.options().url, "/a");
        assert_eq!(b.options().url, "/b");

        let seq = a.begin_operation();
        assert!(a.owns_indicator(seq));
        assert!(!b.owns_indicator(seq));
    }

    #[test]
    fn test_new_operation_shadows_previous() {
        let instance = DropAreaInstance::new(DropAreaOptions::default());
        let first = instance.begin_operation();
        let second = instance.begin_operation();

        assert!(!instance.owns_indicator(first));
        assert!(instance.owns_indicator(second));

        assert!(!instance.release(first));
        assert!(instance.owns_indicator(second));

        assert!(instance.release(second));
        assert!(!instance.owns_indicator(second));
    }

    #[test]
    fn test_abort_hides_indicator_at_once() {
        let instance = DropAreaInstance::new(DropAreaOptions::default());
        let seq = instance.begin_operation();
        let file = CandidateFile::new("photo.jpg", 100);
        let (sink, handle, mut events) = transfer_channel(file, I18n::default(), None);

        sink.unbounded_send(TransferSignal::Progress {
            loaded: 10.0,
            total: 100.0,
            computable: true,
        })
        .unwrap();
        assert!(matches!(block_on(events.next()), Some(UploadEvent::Progress(10))));

        handle.abort();
        assert!(instance.release(seq));
        assert!(!instance.owns_indicator(seq));

        assert!(matches!(block_on(events.next()), Some(UploadEvent::Aborted)));
        assert!(block_on(events.next()).is_none());
    }

    #[test]
    fn test_abort_of_shadowed_upload_keeps_newer_indicator() {
        let instance = DropAreaInstance::new(DropAreaOptions::default());
        let older = instance.begin_operation();
        let newer = instance.begin_operation();

        assert!(!instance.release(older));
        assert!(instance.owns_indicator(newer));
    }
}
