#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use freeze2nix_core::{PackageName, Requirement, parse_version};

/// Pieces of a requirement line, recombined so most inputs reach the parser's
/// inner branches.
#[derive(Debug, Arbitrary)]
struct FuzzRequirement {
    name: String,
    extras: Vec<String>,
    operator: bool,
    version: String,
    marker: Option<String>,
}

fuzz_target!(|input: FuzzRequirement| {
    let mut line = input.name.clone();
    if !input.extras.is_empty() {
        line.push('[');
        line.push_str(&input.extras.join(","));
        line.push(']');
    }
    line.push_str(if input.operator { "==" } else { ">=" });
    line.push_str(&input.version);
    if let Some(marker) = &input.marker {
        line.push_str(" ; ");
        line.push_str(marker);
    }

    let _ = Requirement::looks_like_requirement(&line);
    if let Ok(req) = Requirement::parse(&line) {
        // The displayed form parses back to the same pin.
        let reparsed = Requirement::parse(&req.to_string()).expect("display output parses");
        assert_eq!(reparsed.package(), req.package());
        assert_eq!(reparsed.version(), req.version());
    }

    if let Ok(name) = PackageName::new(&input.name) {
        // Normalization is idempotent.
        assert_eq!(PackageName::new(name.as_str()).unwrap(), name);
    }

    if let Ok(version) = parse_version(&input.version) {
        assert_eq!(parse_version(&version.to_string()).unwrap(), version);
    }
});
