#![forbid(unsafe_code)]

//! Enveloped signature generation.
//!
//! The `<ds:Signature>` element lands inside the document it signs, as
//! the last child of the root element. The reference digest covers the
//! document as rendered before the signature is inserted, which is what
//! the enveloped-signature transform yields on verification.

use base64::Engine;
use sigtuna_core::{algorithm, ns, Error, Result};
use sigtuna_crypto::AlgorithmRegistry;
use sigtuna_keys::{KeyInfo, KeyPair};

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Sign `xml` with `key_pair` and insert the `<ds:Signature>` before the
/// root element's closing tag. `reference_id` must match an ID attribute
/// on the element the signature covers.
pub fn sign_enveloped(key_pair: &KeyPair, reference_id: &str, xml: &str) -> Result<String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| Error::XmlParse(e.to_string()))?;
    // The closing tag is the last "</" within the root element's own byte
    // range; anything after the root (comments, whitespace) is outside it.
    let root_range = doc.root_element().range();
    let insert_at = xml[root_range.start..root_range.end]
        .rfind("</")
        .map(|offset| root_range.start + offset)
        .ok_or_else(|| {
            Error::XmlStructure("root element has no closing tag to envelope a signature".into())
        })?;

    let digest = AlgorithmRegistry::digest(algorithm::SHA256, xml.as_bytes())?;
    let signed_info = build_signed_info(reference_id, &B64.encode(digest));

    let signature = AlgorithmRegistry::sign(
        algorithm::RSA_SHA256,
        key_pair.private_key(),
        signed_info.as_bytes(),
    )?;

    let mut key_info = KeyInfo::new();
    key_info.set_x509_certificate(key_pair.certificate().clone());

    let mut signature_el = String::new();
    signature_el.push_str(&format!(r#"<ds:Signature xmlns:ds="{}">"#, ns::DSIG));
    signature_el.push_str(&signed_info);
    signature_el.push_str(&format!(
        "<ds:SignatureValue>{}</ds:SignatureValue>",
        B64.encode(signature)
    ));
    key_info.write_xml(&mut signature_el);
    signature_el.push_str("</ds:Signature>");

    let mut result = String::with_capacity(xml.len() + signature_el.len());
    result.push_str(&xml[..insert_at]);
    result.push_str(&signature_el);
    result.push_str(&xml[insert_at..]);
    Ok(result)
}

fn build_signed_info(reference_id: &str, digest_b64: &str) -> String {
    format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="{dsig}">"#,
            r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
            r#"<ds:SignatureMethod Algorithm="{sig_alg}"/>"#,
            r##"<ds:Reference URI="#{id}">"##,
            r#"<ds:Transforms>"#,
            r#"<ds:Transform Algorithm="{enveloped}"/>"#,
            r#"<ds:Transform Algorithm="{c14n}"/>"#,
            r#"</ds:Transforms>"#,
            r#"<ds:DigestMethod Algorithm="{digest_alg}"/>"#,
            r#"<ds:DigestValue>{digest}</ds:DigestValue>"#,
            r#"</ds:Reference>"#,
            r#"</ds:SignedInfo>"#,
        ),
        dsig = ns::DSIG,
        c14n = algorithm::EXC_C14N,
        sig_alg = algorithm::RSA_SHA256,
        id = reference_id,
        enveloped = algorithm::ENVELOPED_SIGNATURE,
        digest_alg = algorithm::SHA256,
        digest = digest_b64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = include_str!("../../../fixtures/rsa-a.pem");
    const CERT_A: &str = include_str!("../../../fixtures/cert-a.pem");

    fn key_pair() -> KeyPair {
        KeyPair::from_pem(CERT_A, KEY_A).unwrap()
    }

    fn find<'a>(
        doc: &'a roxmltree::Document<'a>,
        local_name: &str,
    ) -> roxmltree::Node<'a, 'a> {
        doc.descendants()
            .find(|n| n.is_element() && n.tag_name().name() == local_name)
            .unwrap()
    }

    #[test]
    fn test_signature_is_last_child_of_root() {
        let xml = r#"<Doc ID="_abc"><Body>payload</Body></Doc>"#;
        let signed = sign_enveloped(&key_pair(), "_abc", xml).unwrap();
        let doc = roxmltree::Document::parse(&signed).unwrap();
        let last = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .last()
            .unwrap();
        assert_eq!(last.tag_name().name(), ns::node::SIGNATURE);
        assert_eq!(last.tag_name().namespace(), Some(ns::DSIG));
    }

    #[test]
    fn test_digest_covers_unsigned_document() {
        let xml = r#"<Doc ID="_abc"><Body>payload</Body></Doc>"#;
        let signed = sign_enveloped(&key_pair(), "_abc", xml).unwrap();
        let doc = roxmltree::Document::parse(&signed).unwrap();

        let digest_value = find(&doc, ns::node::DIGEST_VALUE).text().unwrap();
        let expected =
            B64.encode(AlgorithmRegistry::digest(algorithm::SHA256, xml.as_bytes()).unwrap());
        assert_eq!(digest_value, expected);

        let reference = find(&doc, ns::node::REFERENCE);
        assert_eq!(reference.attribute(ns::attr::URI), Some("#_abc"));
    }

    #[test]
    fn test_signature_verifies_over_signed_info() {
        let xml = r#"<Doc ID="_abc"><Body>payload</Body></Doc>"#;
        let signed = sign_enveloped(&key_pair(), "_abc", xml).unwrap();
        let doc = roxmltree::Document::parse(&signed).unwrap();

        let signed_info = find(&doc, ns::node::SIGNED_INFO);
        let signed_info_bytes = &signed.as_bytes()[signed_info.range()];

        let signature_b64 = find(&doc, ns::node::SIGNATURE_VALUE).text().unwrap();
        let signature = B64.decode(signature_b64).unwrap();

        sigtuna_crypto::sign::verify(
            algorithm::RSA_SHA256,
            &key_pair().public_key(),
            signed_info_bytes,
            &signature,
        )
        .unwrap();
    }

    #[test]
    fn test_trailing_comment_does_not_shift_insertion() {
        let xml = r#"<Doc ID="_abc"><Body/></Doc><!-- superseded </Old> markup -->"#;
        let signed = sign_enveloped(&key_pair(), "_abc", xml).unwrap();
        assert!(signed.ends_with("<!-- superseded </Old> markup -->"));

        let doc = roxmltree::Document::parse(&signed).unwrap();
        let last = doc
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .last()
            .unwrap();
        assert_eq!(last.tag_name().name(), ns::node::SIGNATURE);
    }

    #[test]
    fn test_certificate_travels_in_key_info() {
        let signed = sign_enveloped(&key_pair(), "_abc", r#"<Doc ID="_abc"></Doc>"#).unwrap();
        assert!(signed.contains("<ds:X509Certificate>"));
    }

    #[test]
    fn test_malformed_document() {
        let result = sign_enveloped(&key_pair(), "_abc", "<Doc");
        assert!(matches!(result, Err(Error::XmlParse(_))));
    }
}
