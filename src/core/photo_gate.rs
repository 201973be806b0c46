/// Gallery after tier gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedGallery {
    pub visible: Vec<String>,
    pub total: usize,
    pub cover: Option<String>,
    pub cover_is_placeholder: bool,
}

/// Keeps the first `photo_limit` images in upload order. `total` always
/// reports the full gallery size. The placeholder is only used as the cover
/// when nothing is visible; it is never added to `visible`.
pub fn gate(gallery: &[String], photo_limit: u32, placeholder: Option<&str>) -> GatedGallery {
    let keep = gallery.len().min(photo_limit as usize);
    let visible = gallery[..keep].to_vec();

    let (cover, cover_is_placeholder) = match visible.first() {
        Some(first) => (Some(first.clone()), false),
        None => (placeholder.map(str::to_string), placeholder.is_some()),
    };

    GatedGallery {
        visible,
        total: gallery.len(),
        cover,
        cover_is_placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Vec<String> {
        (1..=n)
            .map(|i| format!("https://img.example.com/{}.jpg", i))
            .collect()
    }

    #[test]
    fn test_free_listing_with_five_photos() {
        let gallery = photos(5);
        let gated = gate(&gallery, 1, None);

        assert_eq!(gated.visible, vec![gallery[0].clone()]);
        assert_eq!(gated.total, 5);
        assert_eq!(gated.cover.as_deref(), Some(gallery[0].as_str()));
        assert!(!gated.cover_is_placeholder);
    }

    #[test]
    fn test_limit_larger_than_gallery_keeps_order() {
        let gallery = photos(3);
        let gated = gate(&gallery, 999, None);
        assert_eq!(gated.visible, gallery);
        assert_eq!(gated.total, 3);
    }

    #[test]
    fn test_zero_limit_hides_everything() {
        let gallery = photos(4);
        let gated = gate(&gallery, 0, None);
        assert!(gated.visible.is_empty());
        assert_eq!(gated.total, 4);
        assert_eq!(gated.cover, None);
    }

    #[test]
    fn test_placeholder_only_when_nothing_visible() {
        let placeholder = "https://cdn.example.com/dining.png";

        let gated = gate(&[], 2, Some(placeholder));
        assert!(gated.visible.is_empty());
        assert_eq!(gated.cover.as_deref(), Some(placeholder));
        assert!(gated.cover_is_placeholder);

        let gallery = photos(2);
        let gated = gate(&gallery, 2, Some(placeholder));
        assert_eq!(gated.cover.as_deref(), Some(gallery[0].as_str()));
    }
}
