/// Localized UI text catalog
///
/// The web client renders in Japanese or English; it fetches the catalog
/// for its active language and owns the switching logic.
use serde::Serialize;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ja,
    En,
}

impl Lang {
    pub fn parse(s: &str) -> Option<Lang> {
        match s {
            "ja" => Some(Lang::Ja),
            "en" => Some(Lang::En),
            _ => None,
        }
    }
}

/// One language's worth of UI strings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Texts {
    pub welcome_title: &'static str,
    pub enter_pass: &'static str,
    pub submit: &'static str,
    pub incorrect_pass: &'static str,
    pub admin_login: &'static str,
    pub upload: &'static str,
    pub delete: &'static str,
    pub logout: &'static str,
    pub gallery_title: &'static str,
    pub no_photos: &'static str,
    pub upload_success: &'static str,
    pub upload_error: &'static str,
    pub confirm_delete: &'static str,
}

static JA: Texts = Texts {
    welcome_title: "Kouki Galleryへようこそ",
    enter_pass: "パスワードを入力してください",
    submit: "入室",
    incorrect_pass: "パスワードが間違っています",
    admin_login: "管理者ログイン",
    upload: "写真をアップロード",
    delete: "削除",
    logout: "ログアウト",
    gallery_title: "写真集",
    no_photos: "写真がありません。管理者が追加してください。",
    upload_success: "アップロード完了！",
    upload_error: "画像の形式が無効か、サイズが大きすぎます（5MB制限）。",
    confirm_delete: "本当に削除しますか？",
};

static EN: Texts = Texts {
    welcome_title: "Welcome to Kouki Gallery",
    enter_pass: "Please enter password",
    submit: "Enter",
    incorrect_pass: "Incorrect password",
    admin_login: "Admin Login",
    upload: "Upload Photo",
    delete: "Delete",
    logout: "Logout",
    gallery_title: "Photo Collection",
    no_photos: "No photos yet. Admin needs to add some.",
    upload_success: "Upload successful!",
    upload_error: "Invalid image format or file too large (Limit 5MB).",
    confirm_delete: "Are you sure you want to delete?",
};

/// Catalog lookup
pub fn texts(lang: Lang) -> &'static Texts {
    match lang {
        Lang::Ja => &JA,
        Lang::En => &EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_languages() {
        assert_eq!(Lang::parse("ja"), Some(Lang::Ja));
        assert_eq!(Lang::parse("en"), Some(Lang::En));
        assert_eq!(Lang::parse("fr"), None);
    }

    #[test]
    fn test_catalogs_differ() {
        assert_ne!(texts(Lang::Ja).submit, texts(Lang::En).submit);
    }
}
