use std::collections::HashMap;
use std::path::PathBuf;

use super::*;
use crate::foundation::core::Rgba8;

/// Serves file sources by name, finishing later for lower indices so completion order is the
/// reverse of request order.
struct DelayedFetcher {
    bitmaps: HashMap<PathBuf, (Bitmap, u64)>,
}

impl DelayedFetcher {
    fn reversed(n: usize) -> (Self, Vec<ImageSource>, Vec<Bitmap>) {
        let mut bitmaps = HashMap::new();
        let mut sources = Vec::new();
        let mut expected = Vec::new();
        for i in 0..n {
            let path = PathBuf::from(format!("{i}.png"));
            let b = Bitmap::solid(1, 1, Rgba8::opaque(i as u8, 0, 0));
            let delay_ms = ((n - i) * 5) as u64;
            bitmaps.insert(path.clone(), (b.clone(), delay_ms));
            sources.push(ImageSource::File(path));
            expected.push(b);
        }
        (Self { bitmaps }, sources, expected)
    }
}

impl ImageFetcher for DelayedFetcher {
    async fn fetch(&self, source: &ImageSource) -> FourcutResult<Bitmap> {
        let ImageSource::File(path) = source else {
            return Err(FourcutError::validation("only file sources are served"));
        };
        let (bitmap, delay_ms) = self
            .bitmaps
            .get(path)
            .cloned()
            .ok_or_else(|| FourcutError::validation(format!("no such image {}", path.display())))?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(bitmap)
    }
}

#[tokio::test]
async fn reversed_completion_keeps_request_order() {
    let (fetcher, sources, expected) = DelayedFetcher::reversed(12);
    let out = fetch_all(&fetcher, &sources).await.unwrap();
    assert_eq!(out.len(), 12);
    for (got, want) in out.iter().zip(&expected) {
        assert!(got.shares_pixels(want));
    }
}

#[tokio::test]
async fn resident_bitmaps_bypass_the_fetcher() {
    let (fetcher, mut sources, expected) = DelayedFetcher::reversed(3);
    let resident = Bitmap::solid(2, 2, Rgba8::WHITE);
    sources[1] = ImageSource::Bitmap(resident.clone());
    let out = fetch_all(&fetcher, &sources).await.unwrap();
    assert!(out[0].shares_pixels(&expected[0]));
    assert!(out[1].shares_pixels(&resident));
    assert!(out[2].shares_pixels(&expected[2]));
}

#[tokio::test]
async fn single_failure_fails_the_batch() {
    let (fetcher, mut sources, _) = DelayedFetcher::reversed(12);
    sources[7] = ImageSource::File(PathBuf::from("missing.png"));
    let err = fetch_all(&fetcher, &sources).await.unwrap_err();
    match err {
        FourcutError::IncompleteFetch {
            expected, detail, ..
        } => {
            assert_eq!(expected, 12);
            assert!(detail.contains("source #7"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn optional_badge_fetch() {
    let (fetcher, sources, expected) = DelayedFetcher::reversed(1);
    assert!(fetch_optional(&fetcher, None).await.unwrap().is_none());
    let got = fetch_optional(&fetcher, Some(&sources[0]))
        .await
        .unwrap()
        .unwrap();
    assert!(got.shares_pixels(&expected[0]));

    let missing = ImageSource::File(PathBuf::from("nope.png"));
    assert!(matches!(
        fetch_optional(&fetcher, Some(&missing)).await,
        Err(FourcutError::IncompleteFetch { expected: 1, .. })
    ));
}

#[test]
fn assemble_rejects_short_and_duplicate_results() {
    let b = Bitmap::solid(1, 1, Rgba8::BLACK);
    let err = assemble_in_order(3, vec![(0, b.clone()), (1, b.clone())]).unwrap_err();
    assert!(matches!(
        err,
        FourcutError::IncompleteFetch {
            expected: 3,
            fetched: 2,
            ..
        }
    ));

    let err = assemble_in_order(3, vec![(0, b.clone()), (2, b.clone()), (2, b.clone())])
        .unwrap_err();
    assert!(matches!(err, FourcutError::IncompleteFetch { fetched: 1, .. }));
}

#[test]
fn assemble_sorts_by_index() {
    let a = Bitmap::solid(1, 1, Rgba8::BLACK);
    let b = Bitmap::solid(1, 1, Rgba8::WHITE);
    let out = assemble_in_order(2, vec![(1, b.clone()), (0, a.clone())]).unwrap();
    assert!(out[0].shares_pixels(&a));
    assert!(out[1].shares_pixels(&b));
}

#[tokio::test]
async fn source_fetcher_reads_and_decodes_local_files() {
    let dir = PathBuf::from("target").join("fetch_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("red.png");
    image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
        .save(&path)
        .unwrap();

    let fetcher = SourceFetcher::new(&FetchConfig::default()).unwrap();
    let b = fetcher.fetch(&ImageSource::File(path)).await.unwrap();
    assert_eq!((b.width, b.height), (3, 2));
    assert_eq!(b.pixel(0, 0), Some([255, 0, 0, 255]));

    let err = fetcher
        .fetch(&ImageSource::File(dir.join("absent.png")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("absent.png"));
}

#[tokio::test]
async fn source_fetcher_enforces_size_limit() {
    let dir = PathBuf::from("target").join("fetch_unit_limit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("big.bin");
    std::fs::write(&path, vec![0u8; 64]).unwrap();

    let fetcher = SourceFetcher::new(&FetchConfig {
        max_encoded_bytes: 16,
        ..FetchConfig::default()
    })
    .unwrap();
    let err = fetcher.fetch(&ImageSource::File(path)).await.unwrap_err();
    assert!(matches!(err, FourcutError::Validation(_)));
}
