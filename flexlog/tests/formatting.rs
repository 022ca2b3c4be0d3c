use flexlog::clock::quanta::QuantaClock;
use flexlog::config::{TargetConfig, TargetKind, TemplateConfig};
use flexlog::format::FormatterType;
use flexlog::{
    config, loggable, method, params, FlexLog, Level, LoggingConfig, MethodLoggingInterceptor,
};
use serde_json::Value;

use common::VecFlusher;

mod common;

struct Shipping {
    log: MethodLoggingInterceptor,
}

#[loggable(log_both)]
impl Shipping {
    #[log(log_both, formatter = "SimpleTemplate", template = "Dispatch")]
    fn dispatch(&self, parcel: &str) -> Result<u32, String> {
        self.log.try_invoke(method!(Shipping, dispatch), params!(parcel), || {
            if parcel.is_empty() {
                Err("no parcel".to_string())
            } else {
                Ok(3)
            }
        })
    }

    #[log(log_input, target = "Audit", level = "Debug")]
    fn track(&self, code: &str) {
        self.log.invoke(method!(Shipping, track), params!(code), || ())
    }

    #[log(log_output, formatter = "CustomTemplate", template = "Missing")]
    fn rate(&self) -> u32 {
        self.log.invoke(method!(Shipping, rate), params!(), || 12)
    }
}

fn host(config: LoggingConfig) -> (FlexLog, VecFlusher, VecFlusher) {
    let console = VecFlusher::new();
    let audit = VecFlusher::new();
    let (clock, _mock) = QuantaClock::mock();
    let host = FlexLog::builder(config)
        .sink("Console", console.clone())
        .sink("Audit", audit.clone())
        .clock(clock)
        .build()
        .unwrap();
    (host, console, audit)
}

fn templated() -> LoggingConfig {
    config()
        .with_background_logging(false)
        .with_template(
            "Dispatch",
            TemplateConfig::new("{MethodName}({InputParameters})")
                .success("{MethodName} -> {OutputValue} [{Level}]")
                .error("{MethodName} failed: {ExceptionMessage} {Unknown}"),
        )
        .with_target(
            "Audit",
            TargetConfig::new(TargetKind::Noop)
                .formatter(FormatterType::Json)
                .min_level(Level::Debug)
                .message_only(),
        )
}

#[test]
fn named_templates_per_outcome() {
    let (host, console, _audit) = host(templated());
    let shipping = Shipping {
        log: host.interceptor(),
    };

    assert_eq!(shipping.dispatch("box"), Ok(3));
    assert!(shipping.dispatch("").is_err());

    assert_eq!(
        console.messages(),
        [
            "dispatch -> 3 [Information]",
            "dispatch failed: no parcel {Unknown}",
        ]
    );
}

#[test]
fn json_target_with_its_own_layout() {
    let (host, console, audit) = host(templated());
    let shipping = Shipping {
        log: host.interceptor(),
    };

    shipping.track("ZX-9");

    assert!(console.lines().is_empty());
    let lines = audit.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with('\n'));

    let object: Value = serde_json::from_str(lines[0].trim_end()).unwrap();
    assert_eq!(object["TypeName"], "formatting::Shipping");
    assert_eq!(object["MethodName"], "track");
    assert_eq!(object["Level"], "Debug");
    assert_eq!(object["Success"], true);
    assert_eq!(object["Target"], "Audit");
    assert_eq!(object["InputParameters"][0]["Name"], "code");
    assert_eq!(object["InputParameters"][0]["Value"], "ZX-9");
    assert_eq!(
        object["Message"],
        r#"Method formatting::Shipping.track called with {"code":"ZX-9"} completed in 0.00ms"#
    );
}

#[test]
fn target_threshold_and_switch() {
    let config = templated()
        .with_target("Audit", TargetConfig::new(TargetKind::Noop).min_level(Level::Warning));
    let (host, _console, audit) = host(config);
    let shipping = Shipping {
        log: host.interceptor(),
    };
    shipping.track("below threshold");
    assert!(audit.lines().is_empty());

    let config =
        templated().with_target("Audit", TargetConfig::new(TargetKind::Noop).enabled(false));
    let (host, _console, audit) = self::host(config);
    let shipping = Shipping {
        log: host.interceptor(),
    };
    shipping.track("disabled");
    assert!(audit.lines().is_empty());
}

#[test]
fn failing_formatter_renders_fallback() {
    let (host, console, _audit) = host(templated());
    let shipping = Shipping {
        log: host.interceptor(),
    };

    assert_eq!(shipping.rate(), 12);
    assert_eq!(
        console.messages(),
        ["[Fallback] formatting::Shipping.rate completed in 0.00ms | Input:  | Output: 12"]
    );
}

#[test]
fn configured_fallback_template() {
    let config =
        templated().with_fallback_template("Fallback {TypeName}.{MethodName} Success={Success}");
    let (host, console, _audit) = host(config);
    let shipping = Shipping {
        log: host.interceptor(),
    };

    shipping.rate();
    assert_eq!(
        console.messages(),
        ["Fallback formatting::Shipping.rate Success=True"]
    );
}

#[test]
fn disabled_fallback_drops_the_entry() {
    let config = templated().with_fallback_formatting(false);
    let (host, console, _audit) = host(config);
    let shipping = Shipping {
        log: host.interceptor(),
    };

    assert_eq!(shipping.rate(), 12);
    assert!(console.lines().is_empty());
}

#[test]
fn configuration_document() {
    let config = LoggingConfig::from_json_str(
        r#"{
            "EnableBackgroundLogging": false,
            "DefaultFormatter": "Hybrid",
            "Services": {
                "formatting::*": { "LogInput": true, "Level": "Error" }
            },
            "Targets": {
                "Console": { "Type": "Console", "ShowTimestamp": false }
            },
            "Formatters": { "Hybrid": { "Separator": " || " } }
        }"#,
    )
    .unwrap();
    let (host, console, _audit) = host(config);
    let log = host.interceptor();

    // No attributes, the service pattern decides
    struct Rates;
    #[loggable]
    impl Rates {
        fn quote(log: &MethodLoggingInterceptor, zone: u8) -> u32 {
            log.invoke(method!(Rates, quote), params!(zone), || 7)
        }
    }
    assert_eq!(Rates::quote(&log, 4), 7);

    let lines = console.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("[ERR]"));
    let (message, metadata) = lines[0]["[ERR]".len()..].trim_end().split_once(" || ").unwrap();
    assert_eq!(
        message,
        r#"Method formatting::Rates.quote called with {"zone":4} completed in 0.00ms"#
    );
    let metadata: Value = serde_json::from_str(metadata).unwrap();
    assert_eq!(metadata["Level"], "Error");
    assert_eq!(metadata["Target"], "Console");
}
