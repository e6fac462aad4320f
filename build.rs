//! Build script for cpaudit
//!
//! Embeds build-time information (git commit, dirty status, build timestamp)
//! so `cpaudit --version` identifies the exact binary that produced a report.

fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
