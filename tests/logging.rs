use spoiler_scope::logging::init_tracing;

#[test]
fn tracing_can_be_initialised_more_than_once() {
    init_tracing().unwrap();
    init_tracing().unwrap();
    tracing::info!("subscriber installed");
}
