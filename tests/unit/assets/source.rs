use super::*;

#[test]
fn http_and_https_parse_as_remote() {
    for r in ["http://cdn.example.com/a.jpg", "https://cdn.example.com/b.png?x=1"] {
        let src = ImageSource::parse(0, r, None).unwrap();
        let ImageSource::Remote(url) = src else {
            panic!("expected remote for {r}");
        };
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    let src = ImageSource::parse(1, "photos/1.png", Some(Path::new("/data/req"))).unwrap();
    let ImageSource::File(p) = src else {
        panic!("expected file");
    };
    assert_eq!(p, PathBuf::from("/data/req/photos/1.png"));

    let src = ImageSource::parse(1, "/abs/2.png", Some(Path::new("/data/req"))).unwrap();
    let ImageSource::File(p) = src else {
        panic!("expected file");
    };
    assert_eq!(p, PathBuf::from("/abs/2.png"));
}

#[test]
fn file_urls_become_paths() {
    let src = ImageSource::parse(0, "file:///tmp/x.png", None).unwrap();
    let ImageSource::File(p) = src else {
        panic!("expected file");
    };
    assert_eq!(p, PathBuf::from("/tmp/x.png"));
}

#[test]
fn bad_references_name_their_index() {
    let cases = ["", "   ", "ftp://host/a.png", "http://", "https://[::1"];
    for (i, r) in cases.iter().enumerate() {
        let err = ImageSource::parse(i, r, None).unwrap_err();
        match err {
            FourcutError::InvalidReference {
                index, reference, ..
            } => {
                assert_eq!(index, i);
                assert_eq!(reference, *r);
            }
            other => panic!("unexpected error for '{r}': {other}"),
        }
    }
}

#[test]
fn display_and_residency() {
    let b = ImageSource::from(Bitmap::solid(
        4,
        2,
        crate::foundation::core::Rgba8::BLACK,
    ));
    assert!(b.is_resident());
    assert_eq!(b.to_string(), "<bitmap 4x2>");

    let f = ImageSource::parse(0, "a.png", None).unwrap();
    assert!(!f.is_resident());
    assert_eq!(f.to_string(), "a.png");
}
