// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rule-set compilation.
//!
//! # Pipeline
//!
//! 1. Open the document ([`RuleError::Open`])
//! 2. Read it fully ([`RuleError::Read`])
//! 3. Parse and validate ([`RuleError::Parse`], [`RuleError::Invalid`])
//! 4. Encode into memory ([`RuleError::Encode`])
//! 5. Check an existing destination is writable, then create a temp file
//!    next to it ([`RuleError::Create`])
//! 6. Write, sync and rename over the destination ([`RuleError::Write`])
//!
//! The destination is never touched before step 6 and only ever holds a
//! complete compiled rule set. A failed write removes the temp file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::codec::RuleCodec;
use crate::error::{RuleError, RuleResult};
use crate::model::RuleDocument;

/// Summary of a successful compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledRuleSet {
    /// Document version.
    pub version: u8,
    /// Number of top-level rules.
    pub rules: usize,
    /// Size of the written file.
    pub bytes: usize,
}

/// Compiles the rule document at `json_path` into `output_path`.
pub fn compile_rule_set(
    json_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    codec: &dyn RuleCodec,
) -> RuleResult<CompiledRuleSet> {
    let (json_path, output_path) = (json_path.as_ref(), output_path.as_ref());

    match compile(json_path, output_path, codec) {
        Ok(compiled) => {
            info!(
                json = %json_path.display(),
                output = %output_path.display(),
                rules = compiled.rules,
                bytes = compiled.bytes,
                "Rule set compiled"
            );
            Ok(compiled)
        }
        Err(e) => {
            error!(
                json = %json_path.display(),
                output = %output_path.display(),
                code = e.code().code(),
                error = %e,
                "Rule set compilation failed"
            );
            Err(e)
        }
    }
}

fn compile(
    json_path: &Path,
    output_path: &Path,
    codec: &dyn RuleCodec,
) -> RuleResult<CompiledRuleSet> {
    let content = read_document(json_path)?;
    let document = RuleDocument::from_slice(&content)?;

    let mut encoded = Vec::new();
    codec.encode(&document, &mut encoded)?;
    debug!(codec = codec.name(), bytes = encoded.len(), "Rule set encoded");

    let temp = create_temp(output_path)?;
    write_atomically(temp, &encoded, output_path)?;

    Ok(CompiledRuleSet {
        version: document.version,
        rules: document.rules.len(),
        bytes: encoded.len(),
    })
}

fn read_document(path: &Path) -> RuleResult<Vec<u8>> {
    let mut file = File::open(path).map_err(|source| RuleError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content)
}

fn create_temp(output_path: &Path) -> RuleResult<NamedTempFile> {
    let create_err = |source| RuleError::Create {
        path: output_path.to_path_buf(),
        source,
    };

    if output_path.is_dir() {
        return Err(create_err(std::io::Error::other("destination is a directory")));
    }

    // The rename would replace a read-only file; check it opens for writing.
    if output_path.exists() {
        OpenOptions::new()
            .write(true)
            .open(output_path)
            .map_err(create_err)?;
    }

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    tempfile::Builder::new()
        .prefix(".harbor-rules-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(create_err)
}

fn write_atomically(mut temp: NamedTempFile, bytes: &[u8], output_path: &Path) -> RuleResult<()> {
    let write_err = |source| RuleError::Write {
        path: output_path.to_path_buf(),
        source,
    };

    // Dropping `temp` on any early return removes it.
    temp.write_all(bytes).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(output_path)
        .map(drop)
        .map_err(|e| write_err(e.error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryRuleCodec;
    use crate::error::CodecError;
    use harbor_core::ErrorCode;
    use tempfile::TempDir;

    const VALID: &str = r#"{"version": 1, "rules": [{"domain_suffix": ".example.com"}]}"#;

    struct FailingCodec;

    impl RuleCodec for FailingCodec {
        fn name(&self) -> &str {
            "failing"
        }

        fn encode(&self, _: &RuleDocument, out: &mut dyn Write) -> Result<(), CodecError> {
            out.write_all(b"partial")?;
            Err(CodecError::unsupported("rule", "refused"))
        }
    }

    fn setup(json: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("rules.json");
        std::fs::write(&json_path, json).unwrap();
        (dir, json_path)
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_compiles_valid_document() {
        let (dir, json) = setup(VALID);
        let out = dir.path().join("rules.srs");

        let compiled = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap();
        assert_eq!(compiled.rules, 1);

        let bytes = std::fs::read(&out).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(bytes.len(), compiled.bytes);
        assert!(bytes.starts_with(b"SRS"));
        assert_eq!(entries(dir.path()), vec!["rules.json", "rules.srs"]);
    }

    #[test]
    fn test_missing_input_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile_rule_set(
            dir.path().join("absent.json"),
            dir.path().join("out.srs"),
            &BinaryRuleCodec,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileOpenError);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_input_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile_rule_set(dir.path(), dir.path().join("out.srs"), &BinaryRuleCodec)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileReadError);
    }

    #[test]
    fn test_malformed_document_leaves_no_output() {
        let (dir, json) = setup(r#"{"version": 1, "rules": [{"domain": }"#);
        let out = dir.path().join("rules.srs");

        let err = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RuleReadError);
        assert!(!out.exists());
    }

    #[test]
    fn test_malformed_document_keeps_existing_output() {
        let (dir, json) = setup(r#"{"version": 9, "rules": []}"#);
        let out = dir.path().join("rules.srs");
        std::fs::write(&out, b"previous").unwrap();

        let err = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RuleReadError);
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
    }

    #[test]
    fn test_uncreatable_destination() {
        let (dir, json) = setup(VALID);
        let out = dir.path().join("missing").join("rules.srs");

        let err = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileCreateError);
        assert!(!out.exists());
    }

    #[test]
    fn test_directory_destination_untouched() {
        let (dir, json) = setup(VALID);
        let out = dir.path().join("taken");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("keep"), b"data").unwrap();

        let err = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileCreateError);
        assert_eq!(std::fs::read(out.join("keep")).unwrap(), b"data");
    }

    #[test]
    fn test_encode_failure_leaves_nothing_behind() {
        let (dir, json) = setup(VALID);
        let out = dir.path().join("rules.srs");
        std::fs::write(&out, b"previous").unwrap();

        let err = compile_rule_set(&json, &out, &FailingCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileWriteError);
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
        assert_eq!(entries(dir.path()), vec!["rules.json", "rules.srs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_destination_untouched() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, json) = setup(VALID);
        let out = dir.path().join("rules.srs");
        std::fs::write(&out, b"previous").unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o444)).unwrap();
        if OpenOptions::new().write(true).open(&out).is_ok() {
            return; // privileged user
        }

        let err = compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileCreateError);
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
        assert_eq!(entries(dir.path()), vec!["rules.json", "rules.srs"]);
    }

    #[test]
    fn test_replaces_existing_output() {
        let (dir, json) = setup(VALID);
        let out = dir.path().join("rules.srs");
        std::fs::write(&out, b"previous").unwrap();

        compile_rule_set(&json, &out, &BinaryRuleCodec).unwrap();
        assert!(std::fs::read(&out).unwrap().starts_with(b"SRS"));
    }
}
