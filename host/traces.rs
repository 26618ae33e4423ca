use crate::*;

use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::TraceLayer,
};
use tracing::{info_span, Span};
pub use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

fn pretty_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("h2=info".parse().expect("valid directive"))
        .add_directive("hyper=info".parse().expect("valid directive"))
        .add_directive("rustls=info".parse().expect("valid directive"))
        .add_directive("reqwest=info".parse().expect("valid directive"))
        .add_directive("sled=info".parse().expect("valid directive"))
}

/// Initializes log printing, `RUST_LOG` overrides the default INFO level
pub fn init_tracing_subscriber() {
    let shell_layer = fmt::layer()
        .with_timer(ChronoUtc::new("%k:%M:%S".to_owned()))
        .with_filter(pretty_filter());

    tracing_subscriber::registry().with(shell_layer).init()
}

pub fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> Span + Clone + Copy,
    (),
    impl Fn(&Response<Body>, Duration, &Span) + Clone + Copy,
    (),
    (),
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            info_span!("fetch", method = %req.method(), uri = %req.uri())
        })
        .on_request(())
        .on_response(|resp: &Response<Body>, latency: Duration, _span: &Span| {
            let millis = latency.as_secs_f64() * 1000.0;
            let status = resp.status();
            if status.is_server_error() {
                warn!("{status} in {millis:.1}ms");
            } else {
                debug!("{status} in {millis:.1}ms");
            }
        })
        .on_body_chunk(())
        .on_eos(())
}
