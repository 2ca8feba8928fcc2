use crate::error::Error;
use soroban_sdk::{Env, String};

const NAME_CAP: usize = 160;

/// Fixed-size buffer for building cover and tranche names.
///
/// Names only help humans read ledgers, so anything that does not fit is
/// rejected instead of silently truncated.
pub struct NameBuf {
    buf: [u8; NAME_CAP],
    len: usize,
}

impl NameBuf {
    pub fn new() -> Self {
        NameBuf {
            buf: [0u8; NAME_CAP],
            len: 0,
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, Error> {
        let end = self.len + bytes.len();
        if end > NAME_CAP {
            return Err(Error::InvalidName);
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(self)
    }

    pub fn push_string(&mut self, value: &String) -> Result<&mut Self, Error> {
        let n = value.len() as usize;
        let end = self.len + n;
        if end > NAME_CAP {
            return Err(Error::InvalidName);
        }
        value.copy_into_slice(&mut self.buf[self.len..end]);
        self.len = end;
        Ok(self)
    }

    pub fn push_u32(&mut self, value: u32) -> Result<&mut Self, Error> {
        let mut digits = [0u8; 10];
        let mut i = digits.len();
        let mut rest = value;
        loop {
            i -= 1;
            digits[i] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        self.push_bytes(&digits[i..])
    }

    pub fn to_string(&self, env: &Env) -> String {
        String::from_bytes(env, &self.buf[..self.len])
    }
}

/// `<pool>_<nonce>_<collateral symbol>[_<expiry name>]`
pub fn cover_name(
    env: &Env,
    pool_name: &String,
    nonce: u32,
    collateral_symbol: &String,
    expiry_name: Option<&String>,
) -> Result<String, Error> {
    let mut name = NameBuf::new();
    name.push_string(pool_name)?
        .push_bytes(b"_")?
        .push_u32(nonce)?
        .push_bytes(b"_")?
        .push_string(collateral_symbol)?;
    if let Some(expiry_name) = expiry_name {
        name.push_bytes(b"_")?.push_string(expiry_name)?;
    }
    Ok(name.to_string(env))
}

/// `NC_<cover name>`
pub fn no_claim_symbol(env: &Env, cover_name: &String) -> Result<String, Error> {
    let mut name = NameBuf::new();
    name.push_bytes(b"NC_")?.push_string(cover_name)?;
    Ok(name.to_string(env))
}

/// `C_<risk>_<cover name>`
pub fn claim_symbol(env: &Env, risk: &String, cover_name: &String) -> Result<String, Error> {
    let mut name = NameBuf::new();
    name.push_bytes(b"C_")?
        .push_string(risk)?
        .push_bytes(b"_")?
        .push_string(cover_name)?;
    Ok(name.to_string(env))
}

/// `C_FUT<index>_<cover name>`
pub fn future_symbol(env: &Env, index: u32, cover_name: &String) -> Result<String, Error> {
    let mut name = NameBuf::new();
    name.push_bytes(b"C_FUT")?
        .push_u32(index)?
        .push_bytes(b"_")?
        .push_string(cover_name)?;
    Ok(name.to_string(env))
}
