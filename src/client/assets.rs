use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

pub const IMAGE_EXTENSION: &str = "webp";

// everything but the URI-component unreserved marks
const NAME_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Image location for a product: the percent-encoded product name plus the
/// image extension, appended under `asset_base`.
pub fn product_image_url(asset_base: &Url, product_name: &str) -> Option<Url> {
    if asset_base.cannot_be_a_base() {
        return None;
    }

    let mut base = asset_base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }

    let file = format!(
        "{}.{}",
        utf8_percent_encode(product_name, NAME_COMPONENT),
        IMAGE_EXTENSION
    );
    base.join(&file).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_encoded_under_the_base_path() {
        let base = Url::parse("https://assets.example.com/index/").unwrap();

        let url = product_image_url(&base, "Aloe Gel/Cream").unwrap();

        assert_eq!(
            url.as_str(),
            "https://assets.example.com/index/Aloe%20Gel%2FCream.webp"
        );
    }

    #[test]
    fn reserved_characters_are_encoded_like_a_uri_component() {
        let base = Url::parse("https://assets.example.com/index").unwrap();

        let url = product_image_url(&base, "Salt & Pepper+, 2:1 @$=;").unwrap();

        assert_eq!(
            url.as_str(),
            "https://assets.example.com/index/Salt%20%26%20Pepper%2B%2C%202%3A1%20%40%24%3D%3B.webp"
        );
    }

    #[test]
    fn unreserved_marks_stay_readable() {
        let base = Url::parse("https://assets.example.com/").unwrap();

        let url = product_image_url(&base, "Tea-Tree_Oil (Mild)!").unwrap();

        assert_eq!(
            url.as_str(),
            "https://assets.example.com/Tea-Tree_Oil%20(Mild)!.webp"
        );
    }
}
