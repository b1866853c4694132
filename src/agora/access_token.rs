//! Agora RTC access token, version `006`.
//!
//! Layout of a token:
//!
//! ```text
//! "006" ‖ app_id ‖ base64( str(signature) ‖ u32(crc32(channel)) ‖ u32(crc32(uid)) ‖ str(message) )
//! message = u32(salt) ‖ u32(ts) ‖ u16(n) ‖ (u16(privilege) ‖ u32(expire_ts))*n
//! ```
//!
//! All integers are little-endian and `str(x)` is `u16(len) ‖ x`. The signature is
//! HMAC-SHA256 keyed by the app certificate over `app_id ‖ channel ‖ uid ‖ message`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crc::{CRC_32_ISO_HDLC, Crc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use thiserror::Error;

use super::SigningRequest;

pub const VERSION: &str = "006";

/// Agora app ids are 32 hex characters.
pub const APP_ID_LENGTH: usize = 32;

/// Tokens themselves stay valid for a day; privileges carry their own expiry.
pub const TOKEN_VALIDITY_SECS: u32 = 24 * 3600;

pub const MAX_SALT: u32 = 99_999_999;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error("unsupported access token version")]
    UnsupportedVersion,

    #[error("access token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("access token content is truncated")]
    Truncated,

    #[error("failed to initialise HMAC: {0}")]
    Hmac(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u16)]
pub enum Privilege {
    JoinChannel = 1,
    PublishAudioStream = 2,
    PublishVideoStream = 3,
    PublishDataStream = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attendee,
    Publisher,
    Subscriber,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Role::Attendee => 0,
            Role::Publisher => 1,
            Role::Subscriber => 2,
            Role::Admin => 101,
        }
    }

    #[must_use]
    pub const fn can_publish(self) -> bool {
        !matches!(self, Role::Subscriber)
    }
}

/// Uid 0 means "any user" and is encoded as an empty string.
#[must_use]
pub fn uid_string(uid: u32) -> String {
    if uid == 0 {
        String::new()
    } else {
        uid.to_string()
    }
}

#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    // Token fields are far below 64 KiB; longer input is cut rather than wrapped.
    let len = u16::try_from(value.len()).unwrap_or(u16::MAX);
    put_u16(buf, len);
    buf.extend_from_slice(&value[..usize::from(len)]);
}

fn new_mac(app_certificate: &str) -> Result<Hmac<Sha256>, AccessTokenError> {
    Hmac::<Sha256>::new_from_slice(app_certificate.as_bytes())
        .map_err(|e| AccessTokenError::Hmac(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    app_id: String,
    app_certificate: String,
    channel_name: String,
    uid: String,
    salt: u32,
    ts: u32,
    privileges: BTreeMap<u16, u32>,
}

impl AccessToken {
    #[must_use]
    pub fn new(
        app_id: &str,
        app_certificate: &str,
        channel_name: &str,
        uid: u32,
        issued_at: u32,
        salt: u32,
    ) -> Self {
        Self {
            app_id: app_id.to_string(),
            app_certificate: app_certificate.to_string(),
            channel_name: channel_name.to_string(),
            uid: uid_string(uid),
            salt,
            ts: issued_at.saturating_add(TOKEN_VALIDITY_SECS),
            privileges: BTreeMap::new(),
        }
    }

    pub fn add_privilege(&mut self, privilege: Privilege, expire_ts: u32) {
        self.privileges.insert(privilege as u16, expire_ts);
    }

    fn message(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10 + self.privileges.len() * 6);
        put_u32(&mut buf, self.salt);
        put_u32(&mut buf, self.ts);
        put_u16(&mut buf, u16::try_from(self.privileges.len()).unwrap_or(u16::MAX));
        for (privilege, expire_ts) in &self.privileges {
            put_u16(&mut buf, *privilege);
            put_u32(&mut buf, *expire_ts);
        }
        buf
    }

    /// # Errors
    ///
    /// Returns an error if the HMAC cannot be initialised from the certificate.
    pub fn build(&self) -> Result<String, AccessTokenError> {
        let message = self.message();

        let mut mac = new_mac(&self.app_certificate)?;
        mac.update(self.app_id.as_bytes());
        mac.update(self.channel_name.as_bytes());
        mac.update(self.uid.as_bytes());
        mac.update(&message);
        let signature = mac.finalize().into_bytes();

        let mut content = Vec::with_capacity(signature.len() + message.len() + 12);
        put_bytes(&mut content, &signature);
        put_u32(&mut content, crc32(self.channel_name.as_bytes()));
        put_u32(&mut content, crc32(self.uid.as_bytes()));
        put_bytes(&mut content, &message);

        Ok(format!("{VERSION}{}{}", self.app_id, STANDARD.encode(content)))
    }
}

/// Builds a token for `request.uid` with the privileges implied by its role.
///
/// # Errors
///
/// Returns an error if the HMAC cannot be initialised from the certificate.
pub fn build_token_with_uid(
    request: &SigningRequest<'_>,
    issued_at: u32,
    salt: u32,
) -> Result<String, AccessTokenError> {
    let mut token = AccessToken::new(
        request.app_id,
        request.app_certificate,
        request.channel_name,
        request.uid,
        issued_at,
        salt,
    );

    token.add_privilege(Privilege::JoinChannel, request.privilege_expired_ts);
    if request.role.can_publish() {
        token.add_privilege(Privilege::PublishAudioStream, request.privilege_expired_ts);
        token.add_privilege(Privilege::PublishVideoStream, request.privilege_expired_ts);
        token.add_privilege(Privilege::PublishDataStream, request.privilege_expired_ts);
    }

    token.build()
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AccessTokenError> {
        let end = self.pos.checked_add(n).ok_or(AccessTokenError::Truncated)?;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(AccessTokenError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, AccessTokenError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, AccessTokenError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn bytes(&mut self) -> Result<&'a [u8], AccessTokenError> {
        let len = self.u16()?;
        self.take(usize::from(len))
    }
}

/// The parts of a token as read back from its string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub app_id: String,
    pub signature: Vec<u8>,
    pub crc_channel_name: u32,
    pub crc_uid: u32,
    pub salt: u32,
    pub ts: u32,
    pub privileges: BTreeMap<u16, u32>,
    message: Vec<u8>,
}

impl DecodedToken {
    /// # Errors
    ///
    /// Fails on a version other than `006`, invalid base64 or truncated content.
    pub fn parse(token: &str) -> Result<Self, AccessTokenError> {
        if !token.starts_with(VERSION) {
            return Err(AccessTokenError::UnsupportedVersion);
        }
        let app_id_end = VERSION.len() + APP_ID_LENGTH;
        let app_id = token
            .get(VERSION.len()..app_id_end)
            .ok_or(AccessTokenError::Truncated)?;
        let encoded = token.get(app_id_end..).ok_or(AccessTokenError::Truncated)?;
        let content = STANDARD.decode(encoded)?;

        let mut reader = ByteReader::new(&content);
        let signature = reader.bytes()?.to_vec();
        let crc_channel_name = reader.u32()?;
        let crc_uid = reader.u32()?;
        let message = reader.bytes()?.to_vec();

        let mut msg = ByteReader::new(&message);
        let salt = msg.u32()?;
        let ts = msg.u32()?;
        let count = msg.u16()?;
        let mut privileges = BTreeMap::new();
        for _ in 0..count {
            let privilege = msg.u16()?;
            let expire_ts = msg.u32()?;
            privileges.insert(privilege, expire_ts);
        }

        Ok(Self {
            app_id: app_id.to_string(),
            signature,
            crc_channel_name,
            crc_uid,
            salt,
            ts,
            privileges,
            message,
        })
    }

    #[must_use]
    pub fn expiry_of(&self, privilege: Privilege) -> Option<u32> {
        self.privileges.get(&(privilege as u16)).copied()
    }

    /// Checks that the token was issued for this channel and uid with the given certificate.
    #[must_use]
    pub fn verify(&self, app_certificate: &str, channel_name: &str, uid: u32) -> bool {
        let uid = uid_string(uid);
        if crc32(channel_name.as_bytes()) != self.crc_channel_name
            || crc32(uid.as_bytes()) != self.crc_uid
        {
            return false;
        }

        let Ok(mut mac) = new_mac(app_certificate) else {
            return false;
        };
        mac.update(self.app_id.as_bytes());
        mac.update(channel_name.as_bytes());
        mac.update(uid.as_bytes());
        mac.update(&self.message);
        mac.verify_slice(&self.signature).is_ok()
    }
}
