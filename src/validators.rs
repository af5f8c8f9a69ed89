//! # 입력 검증(Validation) 모듈
//!
//! 요청 본문의 필드 단위 검증 규칙을 모아둔 모듈입니다.
//! 각 함수는 실패 시 사람이 읽을 수 있는 메시지를 `Err(String)`으로 반환하고,
//! 호출하는 쪽에서 `ValidationErrors`에 필드 이름과 함께 쌓습니다.
//!
//! - 사용자 이름: 문자/숫자와 `_ . @ + -`만 허용
//! - 태그 slug: 영문자/숫자와 `-`만 허용
//! - 태그 색상: 이름이 있는 CSS3 색상의 HEX 코드만 허용
//! - 비밀번호 정책: 길이, 숫자만으로 구성 금지, 흔한 비밀번호 금지, 사용자 정보 포함 금지

use crate::error::ValidationErrors;
use crate::models::{
    CreateTagRequest, IngredientAmount, IngredientRequest, NewTag, RecipeInput, RecipeWriteRequest,
    UpdateIngredientRequest, UpdateTagRequest,
};
use std::collections::HashSet;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const NAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 150;
pub const TAG_NAME_MAX_LENGTH: usize = 200;
pub const TAG_SLUG_MAX_LENGTH: usize = 200;
pub const INGREDIENT_NAME_MAX_LENGTH: usize = 100;
pub const MEASUREMENT_UNIT_MAX_LENGTH: usize = 10;
pub const RECIPE_NAME_MAX_LENGTH: usize = 200;
pub const RECIPE_TEXT_MAX_LENGTH: usize = 1000;
/// 재료 수량 상한 (SMALLINT 양수 범위)
pub const AMOUNT_MAX: i64 = 32767;

/// 필수 문자열: 공백만 있으면 안 되고 최대 길이(문자 수)를 넘으면 안 됩니다.
pub fn validate_text(value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    if value.chars().count() > max_len {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            max_len
        ));
    }
    Ok(())
}

/// 사용자 이름은 문자·숫자·`_`와 `. @ + -`만 사용할 수 있습니다.
pub fn validate_username(username: &str) -> Result<(), String> {
    validate_text(username, USERNAME_MAX_LENGTH)?;
    let invalid = invalid_chars(username, |c| {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
    });
    if !invalid.is_empty() {
        return Err(format!("Invalid characters: {}", invalid));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    validate_text(email, EMAIL_MAX_LENGTH)?;
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Enter a valid email address.".to_string());
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err("Enter a valid email address.".to_string());
    }
    Ok(())
}

/// 태그 slug는 영문자, 숫자, `-`만 사용할 수 있습니다.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    validate_text(slug, TAG_SLUG_MAX_LENGTH)?;
    let invalid = invalid_chars(slug, |c| c.is_ascii_alphanumeric() || c == '-');
    if !invalid.is_empty() {
        return Err(format!("Invalid characters: {}", invalid));
    }
    Ok(())
}

/// 허용되지 않은 문자를 중복 없이 등장 순서대로 모읍니다.
fn invalid_chars(value: &str, allowed: impl Fn(char) -> bool) -> String {
    let mut seen = HashSet::new();
    value
        .chars()
        .filter(|c| !allowed(*c) && seen.insert(*c))
        .collect()
}

/// 색상 코드를 검증하고 소문자 `#rrggbb` 형태로 정규화해 반환합니다.
///
/// `#abc` 같은 3자리 축약형은 6자리로 펼친 뒤 검사합니다.
/// 이름 있는 CSS3 색상에 해당하지 않으면 거부합니다.
pub fn normalize_color(color: &str) -> Result<String, String> {
    let hex = color
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| "Color must be a HEX code like #ff0000.".to_string())?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Color must be a HEX code like #ff0000.".to_string());
    }
    let hex = hex.to_ascii_lowercase();
    let full = match hex.len() {
        6 => hex,
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        _ => return Err("Color must be a HEX code like #ff0000.".to_string()),
    };
    let normalized = format!("#{}", full);
    if color_name(&normalized).is_none() {
        return Err("There is no name for this color.".to_string());
    }
    Ok(normalized)
}

/// 소문자 `#rrggbb` 코드에 해당하는 CSS3 색상 이름
pub fn color_name(hex: &str) -> Option<&'static str> {
    CSS3_COLORS
        .iter()
        .find(|(_, code)| *code == hex)
        .map(|(name, _)| *name)
}

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "admin123", "letmein1", "trustno1", "superman",
    "1q2w3e4r", "abc12345", "passw0rd", "11111111", "00000000", "asdfghjk",
    "zaq12wsx", "qwerty12", "michael1", "jennifer", "whatever", "starwars",
];

/// 비밀번호 정책을 검사합니다. 위반한 규칙마다 메시지 하나씩 반환합니다.
pub fn validate_password(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }
    if length > PASSWORD_MAX_LENGTH {
        problems.push(format!(
            "Ensure this field has no more than {} characters.",
            PASSWORD_MAX_LENGTH
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    let email_local = email.split('@').next().unwrap_or("");
    let similar = [username, email_local]
        .iter()
        .filter(|attr| attr.chars().count() >= 3)
        .any(|attr| lowered.contains(&attr.to_lowercase()));
    if similar {
        problems.push("The password is too similar to the user information.".to_string());
    }

    problems
}

/// 레시피 요청 본문을 검증해 `RecipeInput`으로 바꿉니다.
///
/// DB를 보지 않고 판단할 수 있는 규칙만 검사합니다
/// (존재하지 않는 재료/태그, 이름 중복은 DB 계층에서 확인).
/// 중복 재료는 여기서 걸러지므로 어떤 행도 쓰기 전에 거부됩니다.
pub fn validate_recipe(req: &RecipeWriteRequest) -> Result<RecipeInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_text(&req.name, RECIPE_NAME_MAX_LENGTH) {
        errors.add("name", e);
    }
    if let Err(e) = validate_text(&req.text, RECIPE_TEXT_MAX_LENGTH) {
        errors.add("text", e);
    }
    if req.cooking_time < 1 {
        errors.add(
            "cooking_time",
            "Ensure this value is greater than or equal to 1.",
        );
    }

    if req.ingredients.is_empty() {
        errors.add("ingredients", "A recipe needs at least one ingredient.");
    }
    if has_duplicates(req.ingredients.iter().map(|i| i.id)) {
        errors.add("ingredients", "The recipe lists the same ingredient more than once.");
    }
    if req
        .ingredients
        .iter()
        .any(|IngredientAmount { amount, .. }| !(1..=AMOUNT_MAX).contains(amount))
    {
        errors.add(
            "ingredients",
            format!("Ingredient amount must be between 1 and {}.", AMOUNT_MAX),
        );
    }

    if req.tags.is_empty() {
        errors.add("tags", "A recipe needs at least one tag.");
    }
    if has_duplicates(req.tags.iter().copied()) {
        errors.add("tags", "The recipe lists the same tag more than once.");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RecipeInput {
        name: req.name.trim().to_string(),
        text: req.text.clone(),
        cooking_time: req.cooking_time,
        ingredients: req.ingredients.clone(),
        tags: req.tags.clone(),
    })
}

/// 새 태그를 검증하고 정규화합니다. slug가 없으면 이름으로부터 만듭니다.
pub fn validate_new_tag(req: &CreateTagRequest) -> Result<NewTag, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = req.name.trim().to_string();
    if let Err(e) = validate_text(&name, TAG_NAME_MAX_LENGTH) {
        errors.add("name", e);
    }
    let color = normalize_color(&req.color).unwrap_or_else(|e| {
        errors.add("color", e);
        String::new()
    });
    let slug = match req.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slug::slugify(&name),
    };
    if let Err(e) = validate_slug(&slug) {
        errors.add("slug", e);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewTag { name, color, slug })
}

/// 태그 부분 수정 요청을 검증합니다. 보낸 필드만 검사하고 색상은 정규화합니다.
pub fn validate_tag_update(req: &UpdateTagRequest) -> Result<UpdateTagRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = req.name.as_deref().map(|n| n.trim().to_string());
    if let Some(Err(e)) = name.as_deref().map(|n| validate_text(n, TAG_NAME_MAX_LENGTH)) {
        errors.add("name", e);
    }
    let color = match req.color.as_deref().map(normalize_color) {
        Some(Ok(color)) => Some(color),
        Some(Err(e)) => {
            errors.add("color", e);
            None
        }
        None => None,
    };
    let slug = req.slug.as_deref().map(|s| s.trim().to_string());
    if let Some(Err(e)) = slug.as_deref().map(validate_slug) {
        errors.add("slug", e);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(UpdateTagRequest { name, color, slug })
}

pub fn validate_ingredient(req: &IngredientRequest) -> Result<IngredientRequest, ValidationErrors> {
    let update = validate_ingredient_update(&UpdateIngredientRequest {
        name: Some(req.name.clone()),
        measurement_unit: Some(req.measurement_unit.clone()),
    })?;
    Ok(IngredientRequest {
        name: update.name.unwrap_or_default(),
        measurement_unit: update.measurement_unit.unwrap_or_default(),
    })
}

pub fn validate_ingredient_update(
    req: &UpdateIngredientRequest,
) -> Result<UpdateIngredientRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = req.name.as_deref().map(|n| n.trim().to_string());
    if let Some(Err(e)) = name.as_deref().map(|n| validate_text(n, INGREDIENT_NAME_MAX_LENGTH)) {
        errors.add("name", e);
    }
    let measurement_unit = req.measurement_unit.as_deref().map(|u| u.trim().to_string());
    if let Some(Err(e)) = measurement_unit
        .as_deref()
        .map(|u| validate_text(u, MEASUREMENT_UNIT_MAX_LENGTH))
    {
        errors.add("measurement_unit", e);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(UpdateIngredientRequest {
        name,
        measurement_unit,
    })
}

fn has_duplicates(mut ids: impl Iterator<Item = i64>) -> bool {
    let mut seen = HashSet::new();
    ids.any(|id| !seen.insert(id))
}

/// CSS3 명명 색상 (이름, 소문자 HEX)
const CSS3_COLORS: &[(&str, &str)] = &[
    ("aliceblue", "#f0f8ff"),
    ("antiquewhite", "#faebd7"),
    ("aqua", "#00ffff"),
    ("aquamarine", "#7fffd4"),
    ("azure", "#f0ffff"),
    ("beige", "#f5f5dc"),
    ("bisque", "#ffe4c4"),
    ("black", "#000000"),
    ("blanchedalmond", "#ffebcd"),
    ("blue", "#0000ff"),
    ("blueviolet", "#8a2be2"),
    ("brown", "#a52a2a"),
    ("burlywood", "#deb887"),
    ("cadetblue", "#5f9ea0"),
    ("chartreuse", "#7fff00"),
    ("chocolate", "#d2691e"),
    ("coral", "#ff7f50"),
    ("cornflowerblue", "#6495ed"),
    ("cornsilk", "#fff8dc"),
    ("crimson", "#dc143c"),
    ("darkblue", "#00008b"),
    ("darkcyan", "#008b8b"),
    ("darkgoldenrod", "#b8860b"),
    ("darkgray", "#a9a9a9"),
    ("darkgreen", "#006400"),
    ("darkkhaki", "#bdb76b"),
    ("darkmagenta", "#8b008b"),
    ("darkolivegreen", "#556b2f"),
    ("darkorange", "#ff8c00"),
    ("darkorchid", "#9932cc"),
    ("darkred", "#8b0000"),
    ("darksalmon", "#e9967a"),
    ("darkseagreen", "#8fbc8f"),
    ("darkslateblue", "#483d8b"),
    ("darkslategray", "#2f4f4f"),
    ("darkturquoise", "#00ced1"),
    ("darkviolet", "#9400d3"),
    ("deeppink", "#ff1493"),
    ("deepskyblue", "#00bfff"),
    ("dimgray", "#696969"),
    ("dodgerblue", "#1e90ff"),
    ("firebrick", "#b22222"),
    ("floralwhite", "#fffaf0"),
    ("forestgreen", "#228b22"),
    ("fuchsia", "#ff00ff"),
    ("gainsboro", "#dcdcdc"),
    ("ghostwhite", "#f8f8ff"),
    ("gold", "#ffd700"),
    ("goldenrod", "#daa520"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("greenyellow", "#adff2f"),
    ("honeydew", "#f0fff0"),
    ("hotpink", "#ff69b4"),
    ("indianred", "#cd5c5c"),
    ("indigo", "#4b0082"),
    ("ivory", "#fffff0"),
    ("khaki", "#f0e68c"),
    ("lavender", "#e6e6fa"),
    ("lavenderblush", "#fff0f5"),
    ("lawngreen", "#7cfc00"),
    ("lemonchiffon", "#fffacd"),
    ("lightblue", "#add8e6"),
    ("lightcoral", "#f08080"),
    ("lightcyan", "#e0ffff"),
    ("lightgoldenrodyellow", "#fafad2"),
    ("lightgray", "#d3d3d3"),
    ("lightgreen", "#90ee90"),
    ("lightpink", "#ffb6c1"),
    ("lightsalmon", "#ffa07a"),
    ("lightseagreen", "#20b2aa"),
    ("lightskyblue", "#87cefa"),
    ("lightslategray", "#778899"),
    ("lightsteelblue", "#b0c4de"),
    ("lightyellow", "#ffffe0"),
    ("lime", "#00ff00"),
    ("limegreen", "#32cd32"),
    ("linen", "#faf0e6"),
    ("maroon", "#800000"),
    ("mediumaquamarine", "#66cdaa"),
    ("mediumblue", "#0000cd"),
    ("mediumorchid", "#ba55d3"),
    ("mediumpurple", "#9370db"),
    ("mediumseagreen", "#3cb371"),
    ("mediumslateblue", "#7b68ee"),
    ("mediumspringgreen", "#00fa9a"),
    ("mediumturquoise", "#48d1cc"),
    ("mediumvioletred", "#c71585"),
    ("midnightblue", "#191970"),
    ("mintcream", "#f5fffa"),
    ("mistyrose", "#ffe4e1"),
    ("moccasin", "#ffe4b5"),
    ("navajowhite", "#ffdead"),
    ("navy", "#000080"),
    ("oldlace", "#fdf5e6"),
    ("olive", "#808000"),
    ("olivedrab", "#6b8e23"),
    ("orange", "#ffa500"),
    ("orangered", "#ff4500"),
    ("orchid", "#da70d6"),
    ("palegoldenrod", "#eee8aa"),
    ("palegreen", "#98fb98"),
    ("paleturquoise", "#afeeee"),
    ("palevioletred", "#db7093"),
    ("papayawhip", "#ffefd5"),
    ("peachpuff", "#ffdab9"),
    ("peru", "#cd853f"),
    ("pink", "#ffc0cb"),
    ("plum", "#dda0dd"),
    ("powderblue", "#b0e0e6"),
    ("purple", "#800080"),
    ("red", "#ff0000"),
    ("rosybrown", "#bc8f8f"),
    ("royalblue", "#4169e1"),
    ("saddlebrown", "#8b4513"),
    ("salmon", "#fa8072"),
    ("sandybrown", "#f4a460"),
    ("seagreen", "#2e8b57"),
    ("seashell", "#fff5ee"),
    ("sienna", "#a0522d"),
    ("silver", "#c0c0c0"),
    ("skyblue", "#87ceeb"),
    ("slateblue", "#6a5acd"),
    ("slategray", "#708090"),
    ("snow", "#fffafa"),
    ("springgreen", "#00ff7f"),
    ("steelblue", "#4682b4"),
    ("tan", "#d2b48c"),
    ("teal", "#008080"),
    ("thistle", "#d8bfd8"),
    ("tomato", "#ff6347"),
    ("turquoise", "#40e0d0"),
    ("violet", "#ee82ee"),
    ("wheat", "#f5deb3"),
    ("white", "#ffffff"),
    ("whitesmoke", "#f5f5f5"),
    ("yellow", "#ffff00"),
    ("yellowgreen", "#9acd32"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_request() -> RecipeWriteRequest {
        RecipeWriteRequest {
            ingredients: vec![
                IngredientAmount { id: 1, amount: 5 },
                IngredientAmount { id: 2, amount: 10 },
            ],
            tags: vec![1],
            image: None,
            name: "Borscht".to_string(),
            text: "Boil everything.".to_string(),
            cooking_time: 90,
        }
    }

    #[test]
    fn usernames_allow_word_chars_and_punctuation() {
        assert!(validate_username("vasya.pupkin+test@x-y_z").is_ok());
        assert!(validate_username("Вася").is_ok());
        let err = validate_username("bad name!").unwrap_err();
        assert!(err.contains(' ') && err.contains('!'));
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn slugs_are_ascii_and_dashes() {
        assert!(validate_slug("main-course-2").is_ok());
        assert!(validate_slug("main_course").is_err());
        assert!(validate_slug("завтрак").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn colors_must_have_a_css_name() {
        assert_eq!(normalize_color("#FF0000").as_deref(), Ok("#ff0000"));
        assert_eq!(normalize_color("#0f0").as_deref(), Ok("#00ff00"));
        assert_eq!(color_name("#49b64e"), None);
        assert!(normalize_color("#49b64e").is_err());
        assert!(normalize_color("ff0000").is_err());
        assert!(normalize_color("#ff00").is_err());
    }

    #[test]
    fn emails_need_local_part_and_domain() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("cook@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("co ok@example.com").is_err());
    }

    #[test]
    fn password_policy_reports_each_problem() {
        assert!(validate_password("s3cure-Pantry", "chef", "chef@example.com").is_empty());
        assert_eq!(validate_password("12345", "chef", "c@x.io").len(), 2);
        assert!(!validate_password("password", "chef", "c@x.io").is_empty());
        assert!(!validate_password("my-chef-kitchen", "chef", "c@x.io").is_empty());
    }

    #[test]
    fn recipe_with_duplicate_ingredients_is_rejected() {
        let mut req = recipe_request();
        req.ingredients.push(IngredientAmount { id: 1, amount: 3 });
        let errors = validate_recipe(&req).unwrap_err();
        assert!(errors.contains("ingredients"));
        assert!(!errors.contains("name"));
    }

    #[test]
    fn recipe_bounds_are_checked() {
        let mut req = recipe_request();
        req.cooking_time = 0;
        req.tags = vec![];
        req.ingredients[0].amount = 0;
        let errors = validate_recipe(&req).unwrap_err();
        assert!(errors.contains("cooking_time"));
        assert!(errors.contains("tags"));
        assert!(errors.contains("ingredients"));
    }

    #[test]
    fn valid_recipe_becomes_input() {
        let input = validate_recipe(&recipe_request()).unwrap();
        assert_eq!(input.name, "Borscht");
        assert_eq!(input.ingredients.len(), 2);
    }

    #[test]
    fn tag_slug_is_derived_from_name() {
        let req = CreateTagRequest {
            name: " Early Breakfast ".to_string(),
            color: "#FFA500".to_string(),
            slug: None,
        };
        let tag = validate_new_tag(&req).unwrap();
        assert_eq!(tag.name, "Early Breakfast");
        assert_eq!(tag.color, "#ffa500");
        assert_eq!(tag.slug, "early-breakfast");
    }

    #[test]
    fn tag_errors_are_keyed_by_field() {
        let req = CreateTagRequest {
            name: String::new(),
            color: "#123456".to_string(),
            slug: Some("no spaces".to_string()),
        };
        let errors = validate_new_tag(&req).unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("color"));
        assert!(errors.contains("slug"));
    }

    #[test]
    fn ingredient_unit_is_short() {
        let req = IngredientRequest {
            name: "Salt".to_string(),
            measurement_unit: "tablespoons".to_string(),
        };
        let errors = validate_ingredient(&req).unwrap_err();
        assert!(errors.contains("measurement_unit"));
        assert!(!errors.contains("name"));

        let update = UpdateIngredientRequest {
            name: Some(" Pepper ".to_string()),
            measurement_unit: None,
        };
        let cleaned = validate_ingredient_update(&update).unwrap();
        assert_eq!(cleaned.name.as_deref(), Some("Pepper"));
        assert!(cleaned.measurement_unit.is_none());
    }
}
