#[cfg(test)]
pub mod test {
    use std::any::Any;
    use std::sync::{Arc, Mutex};

    use crate::error::NexusError;
    use crate::group::Group;
    use crate::leaf::Leaf;
    use crate::node::{Configurable, Named, SetValue};
    use crate::registry::Registry;
    use crate::types::Value;

    /// A node exposing no capabilities at all.
    pub struct Opaque;

    impl Configurable for Opaque {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    /// A named, assignable node without the priority capability. Stores
    /// whatever it is given, untyped.
    pub struct RawSlot {
        name: String,
        value: Mutex<Option<Value>>,
    }

    impl RawSlot {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                value: Mutex::new(None),
            }
        }

        pub fn get(&self) -> Option<Value> {
            self.value.lock().unwrap().clone()
        }
    }

    impl Configurable for RawSlot {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }

        fn as_named(&self) -> Option<&dyn Named> {
            Some(self)
        }

        fn as_setter(&self) -> Option<&dyn SetValue> {
            Some(self)
        }
    }

    impl Named for RawSlot {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl SetValue for RawSlot {
        fn set_value(&self, value: Value) -> Result<(), NexusError> {
            *self.value.lock().unwrap() = Some(value);
            Ok(())
        }
    }

    /// A registry shaped like a small server's configuration:
    ///
    /// ```text
    /// server            (group)
    ///   host  String    "localhost"  $APP_HOST
    ///   port  i64       8080         $APP_PORT
    ///   tls             (group)
    ///     enabled bool  false        $APP_TLS
    /// debug   bool      false        $APP_DEBUG
    /// name    String    "nexus"
    /// ```
    pub struct Sample {
        pub registry: Registry,
        pub server: Arc<Group>,
        pub host: Arc<Leaf<String>>,
        pub port: Arc<Leaf<i64>>,
        pub tls_enabled: Arc<Leaf<bool>>,
        pub debug: Arc<Leaf<bool>>,
        pub name: Arc<Leaf<String>>,
    }

    pub fn sample() -> Sample {
        let registry = Registry::new();

        let server = Group::registered(&registry, "server");
        let host = Leaf::<String>::builder("host")
            .usage("Address to bind")
            .default("localhost".into())
            .env("APP_HOST")
            .register(&*server);
        let port = Leaf::<i64>::builder("port")
            .usage("Port to listen on")
            .default(8080)
            .env("APP_PORT")
            .register(&*server);
        let tls = Group::registered(&*server, "tls");
        let tls_enabled = Leaf::<bool>::builder("enabled")
            .usage("Serve over TLS")
            .env("APP_TLS")
            .register(&*tls);

        let debug = Leaf::<bool>::builder("debug")
            .usage("Enable debug output")
            .env("APP_DEBUG")
            .register(&registry);
        let name = Leaf::<String>::builder("name")
            .usage("Instance name")
            .default("nexus".into())
            .register(&registry);

        Sample {
            registry,
            server,
            host,
            port,
            tls_enabled,
            debug,
            name,
        }
    }

    #[test]
    fn sample_starts_at_defaults() {
        let s = sample();
        assert_eq!(s.registry.len(), 3);
        assert_eq!(s.server.len(), 3);
        assert_eq!(s.host.value(), "localhost");
        assert_eq!(s.port.value(), 8080);
        assert!(!s.tls_enabled.value());
        assert!(!s.debug.value());
        assert_eq!(s.name.value(), "nexus");
    }
}
