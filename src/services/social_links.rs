use serde::{Deserialize, Serialize};

/// Native-app deep link plus the web page to fall back to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub handle: String,
    pub app_link: String,
    pub web_link: String,
}

/// Builds Instagram links for a profile handle, if the card has one
pub fn social_links(handle: Option<&str>) -> Option<SocialLinks> {
    let handle = handle?.trim().trim_start_matches('@').trim();
    // Instagram usernames are letters, digits, periods and underscores
    let valid = handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if handle.is_empty() || !valid {
        return None;
    }

    Some(SocialLinks {
        handle: handle.to_string(),
        app_link: format!("instagram://user?username={}", handle),
        web_link: format!("https://www.instagram.com/{}/", handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_from_handle() {
        assert_eq!(
            social_links(Some("@juanperez")),
            Some(SocialLinks {
                handle: "juanperez".to_string(),
                app_link: "instagram://user?username=juanperez".to_string(),
                web_link: "https://www.instagram.com/juanperez/".to_string(),
            })
        );
        assert_eq!(social_links(Some("  juan.perez ")).unwrap().handle, "juan.perez");
    }

    #[test]
    fn test_no_handle_no_links() {
        assert_eq!(social_links(None), None);
        assert_eq!(social_links(Some("")), None);
        assert_eq!(social_links(Some(" @ ")), None);
        assert_eq!(social_links(Some("juan\"><script>")), None);
    }
}
