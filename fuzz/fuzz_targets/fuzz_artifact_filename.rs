#![no_main]

use libfuzzer_sys::fuzz_target;
use freeze2nix_core::{ArtifactKind, SourceDistFilename, WheelFilename};

fuzz_target!(|data: &[u8]| {
    if let Ok(filename) = std::str::from_utf8(data) {
        // Classification is total.
        let kind = ArtifactKind::of(filename);

        match WheelFilename::parse(filename) {
            Ok(wheel) => {
                assert_eq!(kind, ArtifactKind::Wheel, "parsed wheel not classified as one: {filename}");
                assert!(!wheel.tags.is_empty());
            }
            Err(_) => {}
        }

        if SourceDistFilename::parse(filename).is_ok() {
            assert_eq!(kind, ArtifactKind::SourceArchive, "parsed sdist not classified as one: {filename}");
        }
    }
});
