//! Structured module identity
//!
//! Provides [`ModuleIdentity`], parsed from and rendered to the display form
//!
//! ```text
//! name, Version=major.minor.build.revision, Culture=locale, PublicKeyToken=hex|null
//! ```
//!
//! Missing attributes default to version `0.0.0.0`, culture `neutral` and no
//! key token.

use crate::error::IdentityError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Culture tag used when none is given
const NEUTRAL_CULTURE: &str = "neutral";

/// Four-part module version
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ModuleVersion {
    /// Major component
    pub major: u16,
    /// Minor component
    pub minor: u16,
    /// Build component
    pub build: u16,
    /// Revision component
    pub revision: u16,
}

impl ModuleVersion {
    /// Create a version
    #[inline]
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl Display for ModuleVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for ModuleVersion {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdentityError::InvalidVersion(s.to_string());
        let parts = s
            .split('.')
            .map(|p| p.trim().parse::<u16>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [major, minor, build, revision] => Ok(Self::new(*major, *minor, *build, *revision)),
            _ => Err(invalid()),
        }
    }
}

/// 8-byte signing key fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKeyToken([u8; 8]);

impl PublicKeyToken {
    /// Wrap raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Display for PublicKeyToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PublicKeyToken {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdentityError::InvalidPublicKeyToken(s.to_string());
        let bytes = hex::decode(s.trim()).map_err(|_| invalid())?;
        let arr: [u8; 8] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(arr))
    }
}

/// Identity of the module that defines a redirectable function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    name: String,
    version: ModuleVersion,
    culture: String,
    public_key_token: Option<PublicKeyToken>,
}

impl ModuleIdentity {
    /// Create an identity with default version, neutral culture and no key token
    ///
    /// # Errors
    /// Returns [`IdentityError::EmptyName`] if `name` is blank
    pub fn new(name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(Self {
            name,
            version: ModuleVersion::default(),
            culture: NEUTRAL_CULTURE.to_string(),
            public_key_token: None,
        })
    }

    /// With version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: ModuleVersion) -> Self {
        self.version = version;
        self
    }

    /// With culture tag
    #[inline]
    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    /// With public key token
    #[inline]
    #[must_use]
    pub fn with_public_key_token(mut self, token: PublicKeyToken) -> Self {
        self.public_key_token = Some(token);
        self
    }

    /// Module name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module version
    #[inline]
    #[must_use]
    pub fn version(&self) -> ModuleVersion {
        self.version
    }

    /// Culture tag
    #[inline]
    #[must_use]
    pub fn culture(&self) -> &str {
        &self.culture
    }

    /// Public key token, if the module is signed
    #[inline]
    #[must_use]
    pub fn public_key_token(&self) -> Option<PublicKeyToken> {
        self.public_key_token
    }
}

impl Display for ModuleIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Version={}, Culture={}, PublicKeyToken=",
            self.name, self.version, self.culture
        )?;
        match &self.public_key_token {
            Some(token) => write!(f, "{token}"),
            None => f.write_str("null"),
        }
    }
}

impl FromStr for ModuleIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split(',');
        let name = segments.next().unwrap_or_default().trim();
        let mut identity = Self::new(name)?;

        let mut seen_version = false;
        let mut seen_culture = false;
        let mut seen_token = false;

        for segment in segments {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| IdentityError::MalformedAttribute(segment.trim().to_string()))?;
            let value = value.trim();

            match key.trim() {
                "Version" => {
                    if std::mem::replace(&mut seen_version, true) {
                        return Err(IdentityError::DuplicateAttribute("Version"));
                    }
                    identity.version = value.parse()?;
                }
                "Culture" => {
                    if std::mem::replace(&mut seen_culture, true) {
                        return Err(IdentityError::DuplicateAttribute("Culture"));
                    }
                    identity.culture = value.to_string();
                }
                "PublicKeyToken" => {
                    if std::mem::replace(&mut seen_token, true) {
                        return Err(IdentityError::DuplicateAttribute("PublicKeyToken"));
                    }
                    identity.public_key_token = if value.eq_ignore_ascii_case("null") {
                        None
                    } else {
                        Some(value.parse()?)
                    };
                }
                other => return Err(IdentityError::UnknownAttribute(other.to_string())),
            }
        }

        Ok(identity)
    }
}
