use std::{cell::RefCell, fmt::Debug, io::Write, rc::Rc};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

/// Something that wants to hear about weather updates.
pub trait Subscriber: Debug {
    fn receive(&self, message: &str) -> anyhow::Result<()>;
}

/// Shared reference to a subscriber. Two handles are the same subscriber
/// only if they point at the same allocation.
pub type SubscriberHandle = Rc<dyn Subscriber>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("subscriber #{position} failed to receive update")]
    Subscriber {
        position: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Broadcasts weather updates to every registered subscriber, in the order
/// they were registered.
#[derive(Debug, Default)]
pub struct WeatherService {
    subscribers: Vec<SubscriberHandle>,
}

impl WeatherService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber. Registering the same handle twice means it gets
    /// every message twice.
    pub fn register(&mut self, handle: SubscriberHandle) {
        debug!(subscriber = ?handle, "registering subscriber");
        self.subscribers.push(handle);
    }

    /// Remove the first registration of `handle`. Returns `false` (and changes
    /// nothing) if it was never registered.
    pub fn remove(&mut self, handle: &SubscriberHandle) -> bool {
        match self.subscribers.iter().position(|s| same_subscriber(s, handle)) {
            Some(idx) => {
                let removed = self.subscribers.remove(idx);
                debug!(subscriber = ?removed, position = idx, "removed subscriber");
                true
            }
            None => {
                debug!(subscriber = ?handle, "remove ignored, subscriber not registered");
                false
            }
        }
    }

    /// Deliver `message` to every subscriber in registration order.
    ///
    /// Delivery stops at the first subscriber that fails; the ones after it
    /// do not see this message.
    pub fn notify(&self, message: &str) -> Result<(), NotifyError> {
        debug!(subscribers = self.subscribers.len(), msg = message, "notifying subscribers");

        for (position, subscriber) in self.subscribers.iter().enumerate() {
            subscriber
                .receive(message)
                .map_err(|source| NotifyError::Subscriber { position, source })?;
        }

        Ok(())
    }

    pub fn set_weather_update(&self, weather_info: &str) -> Result<(), NotifyError> {
        info!(weather_info, "weather update");
        self.notify(weather_info)
    }

    pub fn contains(&self, handle: &SubscriberHandle) -> bool {
        self.subscribers.iter().any(|s| same_subscriber(s, handle))
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

fn same_subscriber(a: &SubscriberHandle, b: &SubscriberHandle) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// A named app that writes each update it receives as one line to `out`.
#[derive(Debug)]
pub struct WeatherApp<W: Write> {
    name: String,
    out: RefCell<W>,
}

impl WeatherApp<std::io::Stdout> {
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, std::io::stdout())
    }
}

impl<W: Write> WeatherApp<W> {
    pub fn new(name: impl Into<String>, out: W) -> Self {
        Self {
            name: name.into(),
            out: RefCell::new(out),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Debug> Subscriber for WeatherApp<W> {
    fn receive(&self, message: &str) -> anyhow::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{} received weather update: {}", self.name, message)
            .with_context(|| format!("{} could not write weather update", self.name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
    }

    impl Subscriber for Recorder {
        fn receive(&self, message: &str) -> anyhow::Result<()> {
            self.seen.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    /// Appends `(tag, message)` to a log shared between several subscribers so
    /// tests can check delivery order across them.
    #[derive(Debug)]
    struct Tagged {
        tag: &'static str,
        log: Rc<RefCell<Vec<(&'static str, String)>>>,
    }

    impl Subscriber for Tagged {
        fn receive(&self, message: &str) -> anyhow::Result<()> {
            self.log.borrow_mut().push((self.tag, message.to_string()));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Subscriber for Failing {
        fn receive(&self, _message: &str) -> anyhow::Result<()> {
            Err(anyhow!("display is offline"))
        }
    }

    fn seen(recorder: &Rc<Recorder>) -> Vec<String> {
        recorder.seen.borrow().clone()
    }

    #[test]
    fn notify_reaches_every_subscriber_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut service = WeatherService::new();

        for tag in ["first", "second", "third"] {
            service.register(Rc::new(Tagged {
                tag,
                log: Rc::clone(&log),
            }));
        }

        service.notify("Sunny").expect("notify should succeed");

        let log = log.borrow();
        assert_eq!(
            *log,
            vec![
                ("first", "Sunny".to_string()),
                ("second", "Sunny".to_string()),
                ("third", "Sunny".to_string()),
            ]
        );
    }

    #[test]
    fn removed_subscriber_stops_receiving() {
        let app1 = Rc::new(Recorder::default());
        let app2 = Rc::new(Recorder::default());
        let h1: SubscriberHandle = app1.clone();
        let h2: SubscriberHandle = app2.clone();

        let mut service = WeatherService::new();
        service.register(h1.clone());
        service.register(h2);

        service.set_weather_update("Sunny").unwrap();
        assert!(service.remove(&h1));
        service.set_weather_update("Cloudy").unwrap();

        assert_eq!(seen(&app1), vec!["Sunny"]);
        assert_eq!(seen(&app2), vec!["Sunny", "Cloudy"]);
        assert!(!service.contains(&h1));
    }

    #[test]
    fn removing_unknown_subscriber_is_a_noop() {
        let registered = Rc::new(Recorder::default());
        let stranger: SubscriberHandle = Rc::new(Recorder::default());

        let mut service = WeatherService::new();
        service.register(registered.clone());

        assert!(!service.remove(&stranger));
        assert_eq!(service.len(), 1);

        service.notify("Windy").unwrap();
        assert_eq!(seen(&registered), vec!["Windy"]);
    }

    #[test]
    fn identity_is_by_reference_not_by_value() {
        // Two apps with identical state are still different subscribers.
        let a: SubscriberHandle = Rc::new(WeatherApp::new("Same", Vec::<u8>::new()));
        let b: SubscriberHandle = Rc::new(WeatherApp::new("Same", Vec::<u8>::new()));

        let mut service = WeatherService::new();
        service.register(a.clone());

        assert!(!service.remove(&b));
        assert!(service.remove(&a));
        assert!(service.is_empty());
    }

    #[test]
    fn double_registration_delivers_twice_until_both_removed() {
        let app = Rc::new(Recorder::default());
        let handle: SubscriberHandle = app.clone();

        let mut service = WeatherService::new();
        service.register(handle.clone());
        service.register(handle.clone());

        service.notify("Hail").unwrap();
        assert_eq!(seen(&app), vec!["Hail", "Hail"]);

        assert!(service.remove(&handle));
        service.notify("Fog").unwrap();
        assert_eq!(seen(&app), vec!["Hail", "Hail", "Fog"]);

        assert!(service.remove(&handle));
        assert!(!service.remove(&handle));
        service.notify("Snow").unwrap();
        assert_eq!(seen(&app), vec!["Hail", "Hail", "Fog"]);
    }

    #[test]
    fn remove_takes_out_first_occurrence_only() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a: SubscriberHandle = Rc::new(Tagged {
            tag: "a",
            log: Rc::clone(&log),
        });
        let b: SubscriberHandle = Rc::new(Tagged {
            tag: "b",
            log: Rc::clone(&log),
        });

        let mut service = WeatherService::new();
        service.register(a.clone());
        service.register(b);
        service.register(a.clone());

        service.remove(&a);
        service.notify("Mist").unwrap();

        let tags: Vec<_> = log.borrow().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, vec!["b", "a"]);
    }

    #[test]
    fn failing_subscriber_aborts_the_rest_of_the_broadcast() {
        let before = Rc::new(Recorder::default());
        let after = Rc::new(Recorder::default());

        let mut service = WeatherService::new();
        service.register(before.clone());
        service.register(Rc::new(Failing));
        service.register(after.clone());

        let err = service.notify("Storm").unwrap_err();

        let NotifyError::Subscriber { position, source } = &err;
        assert_eq!(*position, 1);
        assert!(source.to_string().contains("display is offline"));
        assert!(err.to_string().contains("subscriber #1"));

        assert_eq!(seen(&before), vec!["Storm"]);
        assert!(seen(&after).is_empty());
    }

    #[test]
    fn notify_on_empty_service_is_ok() {
        let service = WeatherService::new();
        assert!(service.is_empty());
        assert!(service.notify("Anything").is_ok());
    }

    #[test]
    fn weather_app_writes_one_line_per_update() {
        let app = WeatherApp::new("WeatherApp One", Vec::<u8>::new());
        app.receive("Sunny, 25°C").unwrap();
        app.receive("Rainy, 18°C").unwrap();

        assert_eq!(app.name(), "WeatherApp One");
        let text = String::from_utf8(app.into_inner()).unwrap();
        assert_eq!(
            text,
            "WeatherApp One received weather update: Sunny, 25°C\n\
             WeatherApp One received weather update: Rainy, 18°C\n"
        );
    }
}
