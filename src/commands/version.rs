use gitidentity::config::CONFIG_VERSION;

#[must_use]
pub fn version_line() -> String {
    format!(
        "application: {}, configuration: {CONFIG_VERSION}",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn run() {
    println!("{}", version_line());
}
