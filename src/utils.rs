use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use tempfile::NamedTempFile;

pub fn parse_size(s: &str) -> u64 {
    let s = s.trim().to_lowercase();
    let units = [
        ("gib", 1024u64.pow(3)),
        ("g", 1000u64.pow(3)),
        ("mib", 1024u64.pow(2)),
        ("m", 1000u64.pow(2)),
        ("kib", 1024),
        ("k", 1000),
        ("kb", 1000),
        ("mb", 1000u64.pow(2)),
        ("gb", 1000u64.pow(3)),
        ("b", 1),
    ];

    for (unit, mult) in units {
        if s.ends_with(unit) {
            if let Ok(val) = s.trim_end_matches(unit).parse::<f64>() {
                return (val * mult as f64) as u64;
            }
        }
    }
    s.parse().unwrap_or(0)
}

pub fn is_probably_binary(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return true,
    };
    let mut buffer = [0u8; 4096];
    let n = match file.read(&mut buffer) {
        Ok(n) => n,
        Err(_) => return true,
    };
    if n == 0 {
        return false;
    }

    let slice = &buffer[..n];
    if slice.contains(&0) {
        return true;
    }
    std::str::from_utf8(slice).is_err()
}

pub fn read_text_best_effort(path: &Path, normalize_eol: bool) -> Result<String> {
    let bytes = fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let (res, _, _) = WINDOWS_1252.decode(err.as_bytes());
            res.into_owned()
        }
    };

    if normalize_eol {
        Ok(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Ok(content)
    }
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    // Created next to the target so the final rename stays on one filesystem.
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    // Temp files start 0600; carry an existing target's mode across the swap.
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("5MB"), 5_000_000);
        assert_eq!(parse_size("5m"), 5_000_000);
        assert_eq!(parse_size("1kib"), 1024);
        assert_eq!(parse_size("2GB"), 2_000_000_000);
        assert_eq!(parse_size("123"), 123);
        assert_eq!(parse_size("nonsense"), 0);
    }

    #[test]
    fn binary_sniff() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("a.ts");
        let bin = dir.path().join("b.ts");
        fs::write(&text, "plain text\n").unwrap();
        fs::write(&bin, b"\x00\x01\x02".as_slice()).unwrap();

        assert!(!is_probably_binary(&text));
        assert!(is_probably_binary(&bin));
    }

    #[test]
    fn read_falls_back_to_windows_1252() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("latin.ts");
        fs::write(&file, b"caf\xe9\n".as_slice()).unwrap();

        assert_eq!(read_text_best_effort(&file, false).unwrap(), "caf\u{e9}\n");
    }

    #[test]
    fn read_normalizes_eol_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("eol.ts");
        fs::write(&file, "a\r\nb\rc\n").unwrap();

        assert_eq!(read_text_best_effort(&file, false).unwrap(), "a\r\nb\rc\n");
        assert_eq!(read_text_best_effort(&file, true).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.ts");
        fs::write(&file, "old").unwrap();

        write_atomic(&file, b"new contents\n").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "new contents\n");
        // The swapped-in temp file is the only thing left behind.
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["out.ts"]);
    }

    #[test]
    fn write_atomic_creates_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fresh.ts");

        write_atomic(&file, b"hello\n").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "hello\n");
    }

    #[test]
    fn write_atomic_failure_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner.ts"), "code();\n").unwrap();

        // Renaming a file over a non-empty directory cannot succeed.
        assert!(write_atomic(&target, b"new").is_err());

        assert_eq!(
            fs::read_to_string(target.join("inner.ts")).unwrap(),
            "code();\n"
        );
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["out"]);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_target_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("deploy.sh");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();

        write_atomic(&file, b"#!/bin/sh\nset -e\n").unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "#!/bin/sh\nset -e\n");
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
