//! Command implementations

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context};
use hashchain_core::{HashChain, SerializerRegistry};
use tracing::{debug, info};

use crate::config::CliConfig;

/// Pick the format: explicit flag, then file extension, then config default
pub fn resolve_format(explicit: Option<&str>, path: &Path, config: &CliConfig) -> String {
    if let Some(format) = explicit {
        return format.to_ascii_lowercase();
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ext == "json" || ext == "xml")
        .unwrap_or_else(|| config.default_format.clone())
}

/// Read and validate a chain file
pub fn load_chain(
    path: &Path,
    registry: &SerializerRegistry,
    format: &str,
) -> anyhow::Result<HashChain> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let chain = HashChain::read_from(file, registry, Some(format))
        .with_context(|| format!("{} is not a valid {} chain", path.display(), format))?;
    debug!("Loaded chain {} from {}", chain.chain_id(), path.display());
    Ok(chain)
}

/// Export a chain to `path`, replacing any existing file.
///
/// The export is written to a sibling temp file and renamed over `path`, so
/// a failed export never truncates an existing chain.
pub fn save_chain(
    chain: &HashChain,
    path: &Path,
    registry: &SerializerRegistry,
    format: &str,
) -> anyhow::Result<()> {
    let bytes = chain
        .to_bytes(registry, Some(format))
        .with_context(|| format!("exporting chain {} as {}", chain.chain_id(), format))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(&bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Create a new chain with `payloads` appended and write it out
pub fn create(
    path: &Path,
    format: &str,
    payloads: &[String],
    registry: &SerializerRegistry,
    config: &CliConfig,
) -> anyhow::Result<HashChain> {
    if config.protect_existing && path.exists() {
        bail!("{} already exists", path.display());
    }

    let mut chain = HashChain::new();
    for payload in payloads {
        chain.add(payload)?;
    }
    save_chain(&chain, path, registry, format)?;

    info!(
        "Created chain {} with {} links at {}",
        chain.chain_id(),
        chain.len(),
        path.display()
    );
    Ok(chain)
}

/// Append `payloads` to an existing chain file, returning the new hashes
pub fn append(
    path: &Path,
    format: &str,
    payloads: &[String],
    registry: &SerializerRegistry,
) -> anyhow::Result<Vec<String>> {
    if payloads.is_empty() {
        bail!("nothing to append");
    }

    let mut chain = load_chain(path, registry, format)?;
    let hashes = payloads
        .iter()
        .map(|p| chain.add(p))
        .collect::<hashchain_core::Result<Vec<_>>>()?;
    save_chain(&chain, path, registry, format)?;

    info!("Appended {} links to chain {}", hashes.len(), chain.chain_id());
    Ok(hashes)
}

/// Convert a chain file between formats, validating on the way
pub fn convert(
    input: &Path,
    input_format: &str,
    output: &Path,
    output_format: &str,
    registry: &SerializerRegistry,
) -> anyhow::Result<HashChain> {
    let chain = load_chain(input, registry, input_format)?;
    save_chain(&chain, output, registry, output_format)?;
    info!(
        "Converted chain {} from {} to {}",
        chain.chain_id(),
        input_format,
        output_format
    );
    Ok(chain)
}

/// Human-readable summary of a chain
pub fn render(chain: &HashChain, decode: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Chain:  {}", chain.chain_id());
    let _ = writeln!(out, "Links:  {}", chain.len());
    let _ = writeln!(out);

    for link in chain {
        let created = link
            .timestamp()
            .to_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
            .unwrap_or_else(|| format!("{} ticks", link.timestamp().ticks()));
        let short = link.hash().get(..16).unwrap_or(link.hash());
        let _ = write!(out, "  {:>4}  {}  {}", link.index(), created, short);

        if decode && !link.is_genesis() {
            let _ = write!(out, "  {}", describe_payload(link.payload()));
        } else {
            let _ = write!(out, "  ({} bytes)", link.payload().len());
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Fingerprint: {}", chain);
    out
}

fn describe_payload(payload: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(serde_json::Value::String(s)) => format!("{:?}", s),
        Ok(value) => value.to_string(),
        Err(_) => format!("<{} raw bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashchain_core::{ChainLink, Timestamp};
    use std::path::PathBuf;

    fn setup() -> (tempfile::TempDir, SerializerRegistry, CliConfig) {
        (
            tempfile::tempdir().unwrap(),
            SerializerRegistry::with_defaults(),
            CliConfig::default(),
        )
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_format() {
        let config = CliConfig::default();
        assert_eq!(resolve_format(Some("XML"), Path::new("a.json"), &config), "xml");
        assert_eq!(resolve_format(None, Path::new("a.xml"), &config), "xml");
        assert_eq!(resolve_format(None, Path::new("a.JSON"), &config), "json");
        assert_eq!(resolve_format(None, Path::new("a.chain"), &config), "json");
        assert_eq!(resolve_format(None, &PathBuf::from("noext"), &config), "json");
    }

    #[test]
    fn test_create_append_verify() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.json");

        let created = create(&path, "json", &strings(&["first"]), &registry, &config).unwrap();
        let hashes = append(&path, "json", &strings(&["second", "third"]), &registry).unwrap();
        assert_eq!(hashes.len(), 2);

        let chain = load_chain(&path, &registry, "json").unwrap();
        assert_eq!(chain.chain_id(), created.chain_id());
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.get::<String>(3).unwrap(), "third");
        assert_eq!(chain.tail().hash(), hashes[1]);
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.xml");
        create(&path, "xml", &[], &registry, &config).unwrap();
        assert!(create(&path, "xml", &[], &registry, &config).is_err());

        let relaxed = CliConfig {
            protect_existing: false,
            ..config
        };
        assert!(create(&path, "xml", &[], &registry, &relaxed).is_ok());
    }

    #[test]
    fn test_append_requires_payloads() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.json");
        create(&path, "json", &[], &registry, &config).unwrap();
        assert!(append(&path, "json", &[], &registry).is_err());
    }

    #[test]
    fn test_load_rejects_tampered_file() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.json");
        let chain = create(&path, "json", &strings(&["a", "b"]), &registry, &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let target = chain.links()[1].hash();
        let first = if target.starts_with('f') { 'e' } else { 'f' };
        let forged = format!("{}{}", first, &target[1..]);
        std::fs::write(&path, text.replacen(target, &forged, 1)).unwrap();

        let err = load_chain(&path, &registry, "json").unwrap_err();
        assert!(err.to_string().contains("is not a valid json chain"));
    }

    #[test]
    fn test_convert_json_to_xml() {
        let (dir, registry, config) = setup();
        let input = dir.path().join("ledger.json");
        let output = dir.path().join("ledger.xml");
        let chain = create(&input, "json", &strings(&["x"]), &registry, &config).unwrap();

        convert(&input, "json", &output, "xml", &registry).unwrap();
        let converted = load_chain(&output, &registry, "xml").unwrap();
        assert_eq!(converted, chain);
    }

    #[test]
    fn test_render() {
        let mut chain = HashChain::new();
        chain.add("hello").unwrap();
        chain.append(vec![0xff, 0x00]);

        let text = render(&chain, true);
        assert!(text.contains(chain.chain_id()));
        assert!(text.contains("\"hello\""));
        assert!(text.contains("<2 raw bytes>"));
        assert!(text.contains(&format!("Fingerprint: {}", chain)));

        let plain = render(&chain, false);
        assert!(!plain.contains("\"hello\""));
        assert!(plain.contains("(7 bytes)"));
    }

    #[test]
    fn test_render_tolerates_odd_imported_links() {
        // Trusted links keep whatever hash and ticks the file carried.
        let genesis = ChainLink::new_trusted(
            "imported",
            0,
            Timestamp::from_ticks(i64::MIN),
            Vec::new(),
            "abc",
            None,
        )
        .unwrap();
        let chain = HashChain::from_parts("imported", vec![genesis]).unwrap();

        let text = render(&chain, false);
        assert!(text.contains(&format!("{} ticks", i64::MIN)));
        assert!(text.contains("  abc  "));
        assert!(text.contains("Fingerprint: abc"));
    }

    #[test]
    fn test_failed_convert_keeps_existing_file() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.json");
        let chain = create(&path, "json", &strings(&["keep"]), &registry, &config).unwrap();
        let before = std::fs::read(&path).unwrap();

        assert!(convert(&path, "json", &path, "yaml", &registry).is_err());

        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(load_chain(&path, &registry, "json").unwrap(), chain);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let (dir, registry, config) = setup();
        let path = dir.path().join("ledger.xml");
        create(&path, "xml", &strings(&["one"]), &registry, &config).unwrap();

        let mut chain = load_chain(&path, &registry, "xml").unwrap();
        chain.add("two").unwrap();
        save_chain(&chain, &path, &registry, "xml").unwrap();

        assert_eq!(load_chain(&path, &registry, "xml").unwrap().len(), 3);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
