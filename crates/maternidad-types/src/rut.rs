/// Errors that can occur when normalizing a Chilean RUT.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RutError {
    /// The input did not have the shape of a RUT at all
    #[error("Input is not a well-formed RUT")]
    Malformed,
    /// The verifier character does not match the modulo-11 checksum of the body
    #[error("RUT verifier digit does not match its body")]
    VerifierMismatch,
    /// The body is a single repeated digit, a placeholder rather than a real RUT
    #[error("RUT body is a repeated-digit placeholder")]
    Placeholder,
}

/// A Chilean RUT in canonical form.
///
/// The canonical form is the body digits immediately followed by the verifier
/// character, with no dots or hyphen and a lowercase `k`
/// (`"11.111.111-1"` becomes `"111111111"`). Construction validates the
/// modulo-11 verifier digit, so a `Rut` value always carries a checksum-valid
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rut {
    body: String,
    verifier: char,
}

impl Rut {
    /// Normalizes a raw RUT-like string into its canonical form.
    ///
    /// Dots, spaces and the optional hyphen before the verifier are stripped,
    /// the verifier is lowercased, and the modulo-11 checksum is validated.
    /// Accepts between one and eight body digits.
    pub fn normalize(raw: &str) -> Result<Self, RutError> {
        let mut cleaned = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '.' | ' ' => {}
                '-' => {}
                _ => cleaned.push(c.to_ascii_lowercase()),
            }
        }
        if cleaned.len() < 2 {
            return Err(RutError::Malformed);
        }
        let verifier = cleaned
            .chars()
            .next_back()
            .ok_or(RutError::Malformed)?;
        let body = &cleaned[..cleaned.len() - verifier.len_utf8()];
        if body.is_empty() || body.len() > 8 || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RutError::Malformed);
        }
        if !(verifier.is_ascii_digit() || verifier == 'k') {
            return Err(RutError::Malformed);
        }
        if verifier != expected_verifier(body) {
            return Err(RutError::VerifierMismatch);
        }
        Ok(Self {
            body: body.to_owned(),
            verifier,
        })
    }

    /// Like [`Rut::normalize`], but additionally rejects repeated-digit
    /// placeholder bodies such as `11111111`. Intended for stored person
    /// records, where a placeholder identifier would be a data error.
    pub fn parse_strict(raw: &str) -> Result<Self, RutError> {
        let rut = Self::normalize(raw)?;
        let mut bytes = rut.body.bytes();
        let first = bytes.next();
        if let Some(first) = first {
            if rut.body.len() > 1 && bytes.all(|b| b == first) {
                return Err(RutError::Placeholder);
            }
        }
        Ok(rut)
    }

    /// The canonical lookup key: body digits followed by the verifier, no
    /// separators.
    pub fn canonical(&self) -> String {
        format!("{}{}", self.body, self.verifier)
    }

    /// Dotted display form, e.g. `11.111.111-1`.
    pub fn formatted(&self) -> String {
        let mut grouped = String::new();
        let bytes = self.body.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            let remaining = bytes.len() - i;
            if i > 0 && remaining % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*b as char);
        }
        format!("{}-{}", grouped, self.verifier)
    }
}

impl std::fmt::Display for Rut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.body, self.verifier)
    }
}

/// Modulo-11 verifier for a digit body: weights 2 through 7 cycling from the
/// rightmost digit, remainder 11 maps to `0` and 10 to `k`.
fn expected_verifier(body: &str) -> char {
    let mut sum: u32 = 0;
    let mut weight = 2;
    for b in body.bytes().rev() {
        sum += u32::from(b - b'0') * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'k',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

impl serde::Serialize for Rut {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> serde::Deserialize<'de> for Rut {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rut::normalize(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dotted_form_to_canonical_key() {
        let rut = Rut::normalize("11.111.111-1").expect("Should normalize dotted RUT");
        assert_eq!(rut.canonical(), "111111111");
    }

    #[test]
    fn normalizes_bare_form() {
        let rut = Rut::normalize("12345678-5").expect("Should normalize hyphenated RUT");
        assert_eq!(rut.canonical(), "123456785");
    }

    #[test]
    fn lowercases_k_verifier() {
        // 20.347.878 has verifier k
        let rut = Rut::normalize("20.347.878-K").expect("Should accept uppercase K");
        assert_eq!(rut.canonical(), "20347878k");
    }

    #[test]
    fn rejects_verifier_mismatch() {
        assert_eq!(
            Rut::normalize("12.345.678-9"),
            Err(RutError::VerifierMismatch)
        );
    }

    #[test]
    fn rejects_non_numeric_body() {
        assert_eq!(Rut::normalize("12a45678-5"), Err(RutError::Malformed));
        assert_eq!(Rut::normalize("-5"), Err(RutError::Malformed));
        assert_eq!(Rut::normalize(""), Err(RutError::Malformed));
    }

    #[test]
    fn strict_parse_rejects_placeholder_bodies() {
        assert_eq!(Rut::parse_strict("11.111.111-1"), Err(RutError::Placeholder));
        assert!(Rut::parse_strict("12.345.678-5").is_ok());
    }

    #[test]
    fn formats_with_dot_groups() {
        let rut = Rut::normalize("123456785").expect("Should normalize separator-free RUT");
        assert_eq!(rut.formatted(), "12.345.678-5");
    }
}
