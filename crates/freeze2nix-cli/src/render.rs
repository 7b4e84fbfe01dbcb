//! Nix expression rendering.
//!
//! Every package becomes a `buildPythonPackage` binding in a `let` block,
//! in dependency order; the expression evaluates to the list of directly
//! requested packages.

use freeze2nix_core::PackageName;
use freeze2nix_resolver::ResolvedPackage;

const NIX_KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

/// Render the full expression for packages in emission order.
pub fn render_nix(packages: &[ResolvedPackage]) -> String {
    let mut out = String::from("{ python, nixpkgs }:\nlet\n");
    for package in packages {
        out.push_str(&render_package(package));
    }

    let mut direct: Vec<&PackageName> = packages.iter().filter(|p| p.is_direct).map(|p| &p.name).collect();
    direct.sort_unstable();

    out.push_str("in\n[\n");
    for name in direct {
        out.push_str(&format!("  {}\n", nix_ident(name)));
    }
    out.push_str("]\n");
    out
}

fn render_package(package: &ResolvedPackage) -> String {
    let inputs: String = package
        .dependencies
        .iter()
        .map(|dep| format!("      {}\n", nix_ident(dep)))
        .collect();

    format!(
        "  {name} = (python.pkgs.buildPythonPackage rec {{
    pname = {pname};
    version = {version};
    format = \"{format}\";

    doCheck = false;

    propagatedBuildInputs = [
{inputs}    ];

    src = builtins.fetchurl {{
      url = {url};
      sha256 = {sha256};
    }};
  }});
",
        name = nix_ident(&package.name),
        pname = nix_string(package.name.as_str()),
        version = nix_string(&package.version),
        format = package.format,
        url = nix_string(package.artifact.url.as_str()),
        sha256 = nix_string(&package.sha256),
    )
}

/// Binding name for a package.
///
/// Normalized names only contain `[a-z0-9-]`, so they are Nix identifiers
/// unless they start with a digit or are keywords. Those get a leading `_`,
/// which no normalized name can start with.
fn nix_ident(name: &PackageName) -> String {
    let name = name.as_str();
    if name.starts_with(|c: char| c.is_ascii_digit()) || NIX_KEYWORDS.contains(&name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Double-quoted Nix string literal.
fn nix_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
