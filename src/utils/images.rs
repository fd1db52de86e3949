// La colonne images des produits est un tableau JSON d'URLs stocké en texte.
// Les lectures sont défensives: toute valeur invalide donne un tableau vide.

/// Parse la colonne images d'un produit
pub fn parse_images(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Sérialise une liste d'URLs vers la colonne texte
pub fn serialize_images(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_array() {
        let images = parse_images(r#"["/uploads/a.jpg","/uploads/b.jpg"]"#);
        assert_eq!(images, vec!["/uploads/a.jpg", "/uploads/b.jpg"]);
    }

    #[test]
    fn test_parse_garbage_gives_empty() {
        assert!(parse_images("not json").is_empty());
        assert!(parse_images("").is_empty());
        assert!(parse_images("{\"a\":1}").is_empty());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let urls = vec!["/uploads/a.jpg".to_string()];
        assert_eq!(parse_images(&serialize_images(&urls)), urls);
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(serialize_images(&[]), "[]");
    }
}
