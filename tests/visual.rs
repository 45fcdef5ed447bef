//! Visual regression tests for svgpad.
//!
//! These tests render SVGs with headless Chrome and compare the renders with
//! SSIM: minified markup against its source, and the middle of a normalized
//! document against the source it came from.
//!
//! They need a local Chrome, so they are ignored by default:
//! `cargo test --test visual -- --ignored`

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use futures::StreamExt;
use image::RgbImage;
use image::imageops;
use tokio::task::JoinHandle;

use svgpad::{minify, normalize};

/// Minimum acceptable SSIM score (99.9% similarity)
const MIN_SSIM: f64 = 0.999;

async fn launch() -> (Browser, JoinHandle<()>) {
    let (browser, mut handler) = Browser::launch(BrowserConfig::builder().build().unwrap())
        .await
        .unwrap();

    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });
    (browser, handle)
}

/// Render an SVG string to an image using headless Chrome.
async fn render_svg(browser: &Browser, svg: &str, width: u32, height: u32) -> RgbImage {
    let page = browser.new_page("about:blank").await.unwrap();

    let encoded = base64::Engine::encode(&base64::prelude::BASE64_STANDARD, svg.as_bytes());
    let data_url = format!("data:image/svg+xml;base64,{encoded}");

    let _ = page
        .execute(
            chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams::builder()
                .width(width as i64)
                .height(height as i64)
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .unwrap(),
        )
        .await;

    page.goto(&data_url).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let screenshot = page
        .screenshot(
            chromiumoxide::page::ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
        )
        .await
        .unwrap();

    image::load_from_memory(&screenshot).unwrap().to_rgb8()
}

/// Structural similarity of two equally sized images, on luminance.
/// 1 means identical.
fn compute_ssim(img1: &RgbImage, img2: &RgbImage) -> f64 {
    assert_eq!(img1.dimensions(), img2.dimensions());

    let (width, height) = img1.dimensions();
    let n = (width * height) as f64;

    let c1 = (0.01 * 255.0_f64).powi(2);
    let c2 = (0.03 * 255.0_f64).powi(2);

    let luma = |p: &image::Rgb<u8>| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;

    let (mut sum1, mut sum2, mut sum1_sq, mut sum2_sq, mut sum12) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (p1, p2) in img1.pixels().zip(img2.pixels()) {
        let (l1, l2) = (luma(p1), luma(p2));
        sum1 += l1;
        sum2 += l2;
        sum1_sq += l1 * l1;
        sum2_sq += l2 * l2;
        sum12 += l1 * l2;
    }

    let mu1 = sum1 / n;
    let mu2 = sum2 / n;
    let sigma1_sq = sum1_sq / n - mu1 * mu1;
    let sigma2_sq = sum2_sq / n - mu2 * mu2;
    let sigma12 = sum12 / n - mu1 * mu2;

    ((2.0 * mu1 * mu2 + c1) * (2.0 * sigma12 + c2))
        / ((mu1 * mu1 + mu2 * mu2 + c1) * (sigma1_sq + sigma2_sq + c2))
}

/// Pixel size of a document, from the geometry svgpad reads out of it.
fn dimensions(svg: &str) -> (u32, u32) {
    normalize::parse(svg)
        .geometry
        .map(|g| (g.width as u32, g.height as u32))
        .unwrap_or((256, 256))
}

fn assert_similar(name: &str, expected: &RgbImage, actual: &RgbImage) {
    let ssim = compute_ssim(expected, actual);
    println!(
        "{name}: SSIM = {ssim:.6} ({})",
        if ssim >= MIN_SSIM { "PASS" } else { "FAIL" }
    );
    assert!(
        ssim >= MIN_SSIM,
        "{name}: SSIM {ssim} is below threshold {MIN_SSIM}"
    );
}

async fn check_minified(browser: &Browser, name: &str, svg: &str) {
    let minified = minify(svg, Some(2));
    let (width, height) = dimensions(svg);

    let original = render_svg(browser, svg, width, height).await;
    let rendered = render_svg(browser, &minified, width, height).await;
    assert_similar(name, &original, &rendered);
}

/// The working viewBox is twice the source on each axis, so rendering the
/// normalized document at twice the size puts the source, unscaled, in the
/// middle.
async fn check_normalized(browser: &Browser, name: &str, svg: &str) {
    let attrs = normalize::parse(svg);
    let normalized = normalize::rewrite(svg, &attrs);
    let (width, height) = dimensions(svg);

    let original = render_svg(browser, svg, width, height).await;
    let doubled = render_svg(browser, &normalized, width * 2, height * 2).await;
    let middle = imageops::crop_imm(&doubled, width / 2, height / 2, width, height).to_image();
    assert_similar(name, &original, &middle);
}

const SHAPES: [(&str, &str); 4] = [
    (
        "simple_rect",
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <rect x="10" y="10" width="80" height="80" fill="red"/>
        </svg>"#,
    ),
    (
        "circle_with_fractions",
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <!-- rounded to two places -->
            <circle cx="50.0012" cy="49.9987" r="40.004" fill="blue" stroke="black" stroke-width="2.0001"/>
        </svg>"#,
    ),
    (
        "path_triangle",
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <path d="M 50.001 10 L 90 90.0049 L 10 90 Z" fill="#00ff00"/>
        </svg>"##,
    ),
    (
        "gradient_with_style",
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <style>
                .box { stroke: black; stroke-width: 1.5; }
            </style>
            <defs>
                <linearGradient id="grad1">
                    <stop offset="0%" style="stop-color:rgb(255,255,0);stop-opacity:1" />
                    <stop offset="100%" style="stop-color:rgb(255,0,0);stop-opacity:1" />
                </linearGradient>
            </defs>
            <rect class="box" x="0" y="0" width="100" height="100" fill="url(#grad1)"/>
        </svg>"##,
    ),
];

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_minified_renders_the_same() {
    let (browser, handle) = launch().await;

    for (name, svg) in SHAPES {
        check_minified(&browser, name, svg).await;
    }

    drop(browser);
    handle.abort();
}

#[tokio::test]
#[ignore = "needs a local Chrome"]
async fn test_normalized_keeps_artwork_centered() {
    let (browser, handle) = launch().await;

    for (name, svg) in SHAPES {
        check_normalized(&browser, name, svg).await;
    }

    let view_box_only = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200" width="200" height="200">
        <path d="M 10 80 C 40 10, 65 10, 95 80 S 150 150, 180 80"
              fill="none" stroke="black" stroke-width="2"/>
    </svg>"#;
    check_normalized(&browser, "cubic_bezier", view_box_only).await;

    drop(browser);
    handle.abort();
}
