//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A package as written into snapshot fixtures.
#[derive(Debug, Clone, Copy)]
pub struct Pkg<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub release: u64,
    pub deps: &'a [&'a str],
}

/// Shorthand for a fixture package.
pub const fn pkg<'a>(name: &'a str, version: &'a str, release: u64, deps: &'a [&'a str]) -> Pkg<'a> {
    Pkg {
        name,
        version,
        release,
        deps,
    }
}

/// Write a source tree with one `<name>/package.yml` per package and return its root.
pub fn write_source_tree(dir: &Path, packages: &[Pkg<'_>]) -> PathBuf {
    let root = dir.join("packages");
    for p in packages {
        let pkg_dir = root.join(p.name);
        fs::create_dir_all(&pkg_dir).unwrap();

        let mut recipe = format!(
            "name: {}\nversion: \"{}\"\nrelease: {}\n",
            p.name, p.version, p.release
        );
        if !p.deps.is_empty() {
            recipe.push_str("builddeps:\n");
            for dep in p.deps {
                recipe.push_str(&format!("  - {dep}\n"));
            }
        }
        fs::write(pkg_dir.join("package.yml"), recipe).unwrap();
    }
    fs::create_dir_all(&root).unwrap();
    root
}

/// Write a JSON Lines binary index and return its path.
pub fn write_binary_index(dir: &Path, file_name: &str, packages: &[Pkg<'_>]) -> PathBuf {
    let lines: Vec<String> = packages
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "version": p.version,
                "release": p.release,
                "build_deps": p.deps,
            })
            .to_string()
        })
        .collect();

    let path = dir.join(file_name);
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

/// Write an `eopkg-index.xml` with one binary package per entry and return its path.
pub fn write_repo_index(dir: &Path, packages: &[Pkg<'_>]) -> PathBuf {
    let mut xml = String::from("<PISI>\n");
    for p in packages {
        xml.push_str("  <Package>\n");
        xml.push_str(&format!("    <Name>{}</Name>\n", p.name));
        xml.push_str(&format!("    <Source><Name>{}</Name></Source>\n", p.name));
        if !p.deps.is_empty() {
            xml.push_str("    <BuildDependencies>\n");
            for dep in p.deps {
                xml.push_str(&format!("      <Dependency>{dep}</Dependency>\n"));
            }
            xml.push_str("    </BuildDependencies>\n");
        }
        xml.push_str(&format!(
            "    <History><Update release=\"{}\"><Version>{}</Version></Update></History>\n",
            p.release, p.version
        ));
        xml.push_str("  </Package>\n");
    }
    xml.push_str("</PISI>\n");

    let path = dir.join("eopkg-index.xml");
    fs::write(&path, xml).unwrap();
    path
}

/// Format a `kind:path` reference.
pub fn tpath(kind: &str, path: &Path) -> String {
    format!("{kind}:{}", path.display())
}
