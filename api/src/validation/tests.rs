use super::*;

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        name: None,
        pseudonym: None,
    }
}

fn new_book(title: &str, price: i64) -> NewBook {
    NewBook {
        author_id: 1,
        title: title.to_string(),
        description: None,
        cover: None,
        price,
    }
}

#[test]
fn test_validate_email() {
    assert!(validate_email("user@example.com").is_ok());
    assert!(validate_email("test.user+tag@sub.example.com").is_ok());
    assert!(validate_email("invalid").is_err());
    assert!(validate_email("@example.com").is_err());
    assert!(validate_email("user@").is_err());
    assert!(validate_email("").is_err());
}

#[test]
fn test_validate_url() {
    assert!(validate_url("https://example.com/covers/1.png").is_ok());
    assert!(validate_url("http://sub.example.com").is_ok());
    assert!(validate_url("ftp://example.com").is_err());
    assert!(validate_url("").is_err());
}

#[test]
fn test_validate_username() {
    assert!(validate_username("alice").is_ok());
    assert!(validate_username("alice.smith").is_ok());
    assert!(validate_username("user_99").is_ok());
    assert!(validate_username("a-b").is_ok());
    assert!(validate_username(&"x".repeat(30)).is_ok());

    assert!(validate_username("ab").is_err());
    assert!(validate_username(&"x".repeat(31)).is_err());
    assert!(validate_username("alice smith").is_err());
    assert!(validate_username("alice@home").is_err());
    assert!(validate_username("Admin").is_err());
}

#[test]
fn test_validate_title_and_price() {
    assert!(validate_title("Dune").is_ok());
    assert!(validate_title(&"t".repeat(MAX_TITLE_LEN)).is_ok());
    assert!(validate_title(&"t".repeat(MAX_TITLE_LEN + 1)).is_err());
    assert!(validate_title("   ").is_err());

    assert!(validate_price(0).is_ok());
    assert!(validate_price(15000).is_ok());
    assert!(validate_price(-1).is_err());
}

#[test]
fn test_validate_new_user() {
    assert!(validate_new_user(&new_user("alice", "alice@example.com")).is_ok());
    assert!(validate_new_user(&new_user("alice", "not-an-email")).is_err());
    assert!(validate_new_user(&new_user("root", "root@example.com")).is_err());

    let mut user = new_user("alice", "alice@example.com");
    user.pseudonym = Some("p".repeat(MAX_DISPLAY_NAME_LEN + 1));
    let err = validate_new_user(&user).unwrap_err();
    assert!(err.to_string().starts_with("Pseudonym is too long"));
}

#[test]
fn test_validate_new_book() {
    assert!(validate_new_book(&new_book("Dune", 999)).is_ok());
    assert!(validate_new_book(&new_book("", 999)).is_err());
    assert!(validate_new_book(&new_book("Dune", -5)).is_err());

    let mut book = new_book("Dune", 999);
    book.cover = Some("not a url".to_string());
    assert!(validate_new_book(&book).is_err());
    book.cover = Some("https://covers.example.com/dune.jpg".to_string());
    assert!(validate_new_book(&book).is_ok());
}
