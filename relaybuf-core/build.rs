//! Build script for relaybuf-core
//!
//! Validates feature flag combinations so that impossible platform
//! configurations fail at compile time instead of producing a firmware image
//! that silently logs nowhere or drags std onto an MCU.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_STD");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_EMBEDDED");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEFMT");

    let std_enabled = env::var("CARGO_FEATURE_STD").is_ok();
    let embedded_enabled = env::var("CARGO_FEATURE_EMBEDDED").is_ok();
    let defmt_enabled = env::var("CARGO_FEATURE_DEFMT").is_ok();

    if std_enabled && embedded_enabled {
        panic!(
            r#"
❌ Invalid feature combination: Cannot enable both 'std' and 'embedded'

   The 'std' and 'embedded' features are mutually exclusive platform targets.

   Valid combinations:
   • std                                    (host builds and tests)
   • std + tracing                          (host builds with structured logs)
   • embedded + defmt                       (MCU firmware)
   • embedded + alloc                       (MCU firmware with a heap-backed buffer)

   Use: default-features = false, features = ["embedded"]
"#
        );
    }

    if defmt_enabled && std_enabled {
        panic!(
            r#"
❌ Invalid feature combination: 'defmt' requires the 'embedded' platform

   defmt logs over a debug probe transport and is only meaningful on MCUs.
   Use 'tracing' for host builds.

   Use: default-features = false, features = ["embedded", "defmt"]
"#
        );
    }
}
