use time::format_description;
use time::OffsetDateTime;

/// Publish `var` to the crate, taken from the environment when set
/// (reproducible builds) and from the build clock otherwise.
fn stamp(var: &str, now: OffsetDateTime, pattern: &str) {
    let value = std::env::var(var).unwrap_or_else(|_| {
        format_description::parse(pattern)
            .ok()
            .and_then(|fmt| now.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rerun-if-env-changed={}", var);
    println!("cargo:rustc-env={}={}", var, value);
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("GOCAD_BUILD_DATE", now, "[year]-[month]-[day]");
    stamp("GOCAD_BUILD_TIME", now, "[hour]:[minute]:[second] UTC");
}
