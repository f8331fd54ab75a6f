//! Read-only catalog of the supported algorithm ids.
//!
//! The catalog is loaded once (built-in JSON or a user file) and never
//! mutated afterwards; the dispatcher receives it by value at construction.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::CipherKind;
use crate::error::{CatalogError, PbeError};

/// Catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../data/algorithms.json");

/// Generation of the envelope format an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// PBKDF2-HMAC-SHA512 + AES-256-CBC, envelope `salt(16) | iv(16) | ct`.
    Modern,
    /// Iterated MD5 + DES or TripleDES CBC, envelope `salt(8) | ct`.
    Legacy {
        cipher: CipherKind,
        key_len: usize,
        iv_len: usize,
    },
}

impl Family {
    fn of(cipher: CipherKind) -> Self {
        match cipher {
            CipherKind::Aes256 => Family::Modern,
            CipherKind::Des | CipherKind::TripleDes => Family::Legacy {
                cipher,
                key_len: cipher.key_len(),
                iv_len: cipher.iv_len(),
            },
        }
    }

    pub fn cipher(&self) -> CipherKind {
        match self {
            Family::Modern => CipherKind::Aes256,
            Family::Legacy { cipher, .. } => *cipher,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::Modern => "modern",
            Family::Legacy { .. } => "legacy",
        }
    }
}

/// One catalog record as it appears in the JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub default_iterations: u32,
    #[serde(default)]
    pub spring_boot_version: Option<String>,
    #[serde(default)]
    pub spring_boot_default: Option<String>,
    #[serde(default)]
    pub cipher: Option<CipherKind>,
}

/// A resolved, supported cipher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSpec {
    id: String,
    name: String,
    description: String,
    family: Family,
    default_iterations: u32,
    spring_boot_version: Option<String>,
    spring_boot_default: Option<String>,
}

impl AlgorithmSpec {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn default_iterations(&self) -> u32 {
        self.default_iterations
    }

    pub fn spring_boot_version(&self) -> Option<&str> {
        self.spring_boot_version.as_deref()
    }

    pub fn spring_boot_default(&self) -> Option<&str> {
        self.spring_boot_default.as_deref()
    }

    fn resolve(id: &str, entry: CatalogEntry) -> Result<Self, CatalogError> {
        let id = id.to_ascii_uppercase();

        if entry.default_iterations == 0 {
            return Err(CatalogError::ZeroIterations(id));
        }

        let cipher = match entry.cipher {
            Some(cipher) => cipher,
            None => infer_cipher(&id).ok_or_else(|| CatalogError::UnsupportedAlgorithm(id.clone()))?,
        };

        Ok(Self {
            family: Family::of(cipher),
            name: entry.name,
            description: entry.description,
            default_iterations: entry.default_iterations,
            spring_boot_version: entry.spring_boot_version,
            spring_boot_default: entry.spring_boot_default,
            id,
        })
    }
}

/// Classify an upper-case id that carries no explicit cipher.
///
/// Only the exact suffixes this codec implements are accepted; anything else
/// (SHA-256 PBKDF2, AES-128, RC2, ...) is refused rather than guessed.
fn infer_cipher(id: &str) -> Option<CipherKind> {
    if id.ends_with("HMACSHA512ANDAES_256") {
        Some(CipherKind::Aes256)
    } else if id.ends_with("MD5ANDTRIPLEDES") || id.ends_with("MD5ANDDESEDE") {
        Some(CipherKind::TripleDes)
    } else if id.ends_with("MD5ANDDES") {
        Some(CipherKind::Des)
    } else {
        None
    }
}

/// Immutable id -> [`AlgorithmSpec`] mapping.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: BTreeMap<String, AlgorithmSpec>,
}

impl Registry {
    /// Registry backed by the catalog embedded in the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Reads a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: BTreeMap<String, CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (String, CatalogEntry)>,
    {
        let mut specs = BTreeMap::new();
        for (id, entry) in entries {
            let spec = AlgorithmSpec::resolve(&id, entry)?;
            specs.insert(spec.id.clone(), spec);
        }

        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { specs })
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, id: &str) -> Result<&AlgorithmSpec, PbeError> {
        self.specs
            .get(&id.to_ascii_uppercase())
            .ok_or_else(|| PbeError::UnknownAlgorithm(id.to_string()))
    }

    /// The algorithm marked as default for a framework major version.
    pub fn default_for_framework(&self, version: &str) -> Option<&AlgorithmSpec> {
        let version = version.trim().trim_end_matches(".x");
        self.specs
            .values()
            .find(|spec| spec.spring_boot_default() == Some(version))
    }

    /// Specs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
