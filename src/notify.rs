//! Lifecycle notifications fired around every artifact write.
//!
//! A [Notifier] is a registry of observers shared by every
//! build unit in a process. Observers subscribe to one or
//! more [Channel]s and are invoked synchronously, on the
//! thread running the build unit, in subscription order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Named points in a build unit at which observers are notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Before a minified file is (possibly) written.
    BeforeWriteMinified,

    /// After a minified file is (possibly) written.
    AfterWriteMinified,

    /// Before a gzip file is (possibly) written.
    BeforeWriteGzip,

    /// After a gzip file is (possibly) written.
    AfterWriteGzip,
}

impl Channel {
    /// Every channel, in the order they fire within a build unit.
    pub const ALL: [Channel; 4] = [
        Channel::BeforeWriteMinified,
        Channel::AfterWriteMinified,
        Channel::BeforeWriteGzip,
        Channel::AfterWriteGzip,
    ];

    /// Returns true for the channels fired before a write.
    pub fn is_before(&self) -> bool {
        matches!(self, Channel::BeforeWriteMinified | Channel::BeforeWriteGzip)
    }
}

/// Context delivered with every notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// The file the artifact is derived from.
    pub subject: PathBuf,

    /// The artifact being written.
    pub derived: PathBuf,

    /// Iff false, the artifact is already up to date
    /// and the write is (or was) skipped.
    pub changed: bool,
}

impl LifecycleEvent {
    pub fn new(subject: &Path, derived: &Path, changed: bool) -> Self {
        Self {
            subject: subject.to_path_buf(),
            derived: derived.to_path_buf(),
            changed,
        }
    }
}

/// A thing that observes artifact lifecycle notifications.
pub trait ObservesArtifacts: Send + Sync {
    /// Handles `event`, fired on `channel`.
    fn notify(&self, channel: Channel, event: &LifecycleEvent);
}

impl<F> ObservesArtifacts for F
where
    F: Fn(Channel, &LifecycleEvent) + Send + Sync,
{
    fn notify(&self, channel: Channel, event: &LifecycleEvent) {
        self(channel, event)
    }
}

/// Handle identifying one subscription to a [Notifier].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registered observer.
struct Subscription {
    id: SubscriptionId,
    channels: Vec<Channel>,
    observer: Arc<dyn ObservesArtifacts>,
}

/// A registry of [ObservesArtifacts] implementations.
///
/// Subscribing, unsubscribing, and firing are safe from any
/// number of threads. Observers are invoked outside the
/// registry's lock, so they may subscribe or unsubscribe
/// while being notified; such changes apply from the next
/// notification onward. Nothing is buffered or replayed for
/// late subscribers.
#[derive(Default)]
pub struct Notifier {
    next_id: AtomicU64,
    subscriptions: RwLock<Vec<Subscription>>,
}

impl Notifier {
    /// Returns a new notifier without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `observer` to `channels`.
    pub fn subscribe(
        &self,
        channels: &[Channel],
        observer: Arc<dyn ObservesArtifacts>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscriptions.write().push(Subscription {
            id,
            channels: channels.to_vec(),
            observer,
        });

        tracing::trace!("subscribed {:?} to {:?}", id, channels);
        id
    }

    /// Subscribes `observer` to every [Channel].
    pub fn subscribe_all(&self, observer: Arc<dyn ObservesArtifacts>) -> SubscriptionId {
        self.subscribe(&Channel::ALL, observer)
    }

    /// Removes the subscription `id`.
    ///
    /// Returns false if no such subscription exists.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        before != subscriptions.len()
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Notifies every observer subscribed to `channel` of `event`.
    pub fn fire(&self, channel: Channel, event: &LifecycleEvent) {
        // Snapshot the observers so none run while the lock is held.
        let observers: Vec<Arc<dyn ObservesArtifacts>> = self
            .subscriptions
            .read()
            .iter()
            .filter(|subscription| subscription.channels.contains(&channel))
            .map(|subscription| Arc::clone(&subscription.observer))
            .collect();

        for observer in observers {
            observer.notify(channel, event);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use parking_lot::Mutex;

    use super::*;

    /// Observer recording every notification it receives.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(Channel, LifecycleEvent)>>,
    }

    impl ObservesArtifacts for Recorder {
        fn notify(&self, channel: Channel, event: &LifecycleEvent) {
            self.seen.lock().push((channel, event.clone()));
        }
    }

    fn event() -> LifecycleEvent {
        LifecycleEvent::new(Path::new("app.js"), Path::new("app.min.js"), true)
    }

    #[test]
    fn notifies_subscribed_channels_only() {
        let notifier = Notifier::new();
        let minified = Arc::new(Recorder::default());
        let everything = Arc::new(Recorder::default());
        notifier.subscribe(
            &[Channel::BeforeWriteMinified, Channel::AfterWriteMinified],
            minified.clone(),
        );
        notifier.subscribe_all(everything.clone());

        for channel in Channel::ALL {
            notifier.fire(channel, &event());
        }

        let seen: Vec<_> = minified.seen.lock().iter().map(|(c, _)| *c).collect();
        assert_eq!(
            vec![Channel::BeforeWriteMinified, Channel::AfterWriteMinified],
            seen
        );

        let seen: Vec<_> = everything.seen.lock().iter().map(|(c, _)| *c).collect();
        assert_eq!(Channel::ALL.to_vec(), seen);
        assert_eq!(event(), everything.seen.lock()[0].1);
    }

    #[test]
    fn unsubscribes_observers() {
        let notifier = Notifier::new();
        let recorder = Arc::new(Recorder::default());
        let id = notifier.subscribe_all(recorder.clone());
        assert_eq!(1, notifier.subscriber_count());

        notifier.fire(Channel::BeforeWriteGzip, &event());
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.fire(Channel::AfterWriteGzip, &event());

        assert_eq!(0, notifier.subscriber_count());
        assert_eq!(1, recorder.seen.lock().len());
    }

    #[test]
    fn fires_without_subscribers() {
        Notifier::new().fire(Channel::BeforeWriteMinified, &event());
    }

    #[test]
    fn notifies_closures() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        notifier.subscribe(
            &[Channel::AfterWriteMinified],
            Arc::new(move |_: Channel, event: &LifecycleEvent| {
                assert!(event.changed);
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        notifier.fire(Channel::AfterWriteMinified, &event());
        notifier.fire(Channel::BeforeWriteMinified, &event());
        assert_eq!(1, count.load(Ordering::SeqCst));
    }

    #[test]
    fn allows_unsubscribing_while_notified() {
        let notifier = Arc::new(Notifier::new());
        let id = Arc::new(Mutex::new(None));

        let observer_notifier = Arc::clone(&notifier);
        let observer_id = Arc::clone(&id);
        let subscribed = notifier.subscribe_all(Arc::new(
            move |_: Channel, _: &LifecycleEvent| {
                if let Some(id) = observer_id.lock().take() {
                    observer_notifier.unsubscribe(id);
                }
            },
        ));
        *id.lock() = Some(subscribed);

        notifier.fire(Channel::BeforeWriteMinified, &event());
        assert_eq!(0, notifier.subscriber_count());
    }

    #[test]
    fn notifies_from_many_threads() {
        let notifier = Arc::new(Notifier::new());
        let recorder = Arc::new(Recorder::default());
        notifier.subscribe_all(recorder.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let notifier = Arc::clone(&notifier);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let id = notifier.subscribe_all(Arc::new(Recorder::default()));
                        notifier.fire(Channel::BeforeWriteMinified, &event());
                        notifier.unsubscribe(id);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(800, recorder.seen.lock().len());
        assert_eq!(1, notifier.subscriber_count());
    }
}
