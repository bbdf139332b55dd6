//! 特徴点の検出と照合
//!
//! FAST-9コーナー（極大抑制・スコア上位）＋ BRIEF記述子、
//! ハミング距離の総当たり＋クロスチェック（相互最近傍）で照合する。

use image::GrayImage;
use imageproc::binary_descriptors::brief::{brief, TestPair};
use imageproc::binary_descriptors::BinaryDescriptor;
use imageproc::corners::{corners_fast9, Corner};
use imageproc::point::Point;
use imageproc::suppress::local_maxima;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// 1枚あたりの最大特徴点数
pub const MAX_KEYPOINTS: usize = 600;
const FAST_THRESHOLD: u8 = 20;
const SUPPRESSION_RADIUS: u32 = 3;
const DESCRIPTOR_BITS: usize = 256;
/// BRIEFパッチが画像内に収まるための余白
const PATCH_MARGIN: u32 = 20;
/// BRIEFパッチ（31x31）
const BRIEF_PATCH_RADIUS: u32 = 15;
const BRIEF_PATCH_DIAMETER: u32 = BRIEF_PATCH_RADIUS * 2 + 1;
const TEST_PAIR_SIGMA: f32 = 6.6;
/// テストペア生成の乱数シード（実行ごとに結果を変えない）
const TEST_PAIR_SEED: u64 = 0x5eed_b21e;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureMatch {
    pub keypoints_reference: usize,
    pub keypoints_return: usize,
    /// どちらかに記述子がなければ None（照合しない）
    pub matched_pairs: Option<usize>,
}

/// スコア上位の特徴点（記述子を計算できる位置のみ）
pub fn detect_keypoints(gray: &GrayImage) -> Vec<Point<u32>> {
    let (width, height) = gray.dimensions();
    if width <= 2 * PATCH_MARGIN || height <= 2 * PATCH_MARGIN {
        return Vec::new();
    }

    let corners = corners_fast9(gray, FAST_THRESHOLD);
    let mut corners: Vec<Corner> = local_maxima(&corners, SUPPRESSION_RADIUS)
        .into_iter()
        .filter(|c| {
            c.x >= PATCH_MARGIN
                && c.y >= PATCH_MARGIN
                && c.x + PATCH_MARGIN < width
                && c.y + PATCH_MARGIN < height
        })
        .collect();

    corners.sort_by(|a, b| b.score.total_cmp(&a.score));
    corners.truncate(MAX_KEYPOINTS);

    corners.into_iter().map(|c| Point::new(c.x, c.y)).collect()
}

/// 2枚の特徴点を照合
pub fn match_features(reference: &GrayImage, returned: &GrayImage) -> Result<FeatureMatch, String> {
    let keypoints_reference = detect_keypoints(reference);
    let keypoints_return = detect_keypoints(returned);

    let mut result = FeatureMatch {
        keypoints_reference: keypoints_reference.len(),
        keypoints_return: keypoints_return.len(),
        matched_pairs: None,
    };

    if keypoints_reference.is_empty() || keypoints_return.is_empty() {
        return Ok(result);
    }

    // 両画像で同じテストペアを使う
    let test_pairs = brief_test_pairs(DESCRIPTOR_BITS)?;
    let (descriptors_reference, _) =
        brief(reference, &keypoints_reference, DESCRIPTOR_BITS, Some(&test_pairs))?;
    let (descriptors_return, _) =
        brief(returned, &keypoints_return, DESCRIPTOR_BITS, Some(&test_pairs))?;

    result.keypoints_reference = descriptors_reference.len();
    result.keypoints_return = descriptors_return.len();

    if !descriptors_reference.is_empty() && !descriptors_return.is_empty() {
        result.matched_pairs = Some(cross_check_matches(&descriptors_reference, &descriptors_return));
    }

    Ok(result)
}

/// パッチ中心まわりの等方ガウス分布から固定シードでテストペアを生成
pub fn brief_test_pairs(length: usize) -> Result<Vec<TestPair>, String> {
    let distribution = Normal::new(BRIEF_PATCH_RADIUS as f32 + 1.0, TEST_PAIR_SIGMA)
        .map_err(|e| e.to_string())?;
    let mut rng = StdRng::seed_from_u64(TEST_PAIR_SEED);

    let mut pairs = Vec::with_capacity(length);
    while pairs.len() < length {
        let mut sample = || distribution.sample(&mut rng);
        let (x0, y0, x1, y1) = (sample(), sample(), sample(), sample());
        // 負値・パッチ外は捨てる
        if [x0, y0, x1, y1]
            .iter()
            .all(|v| *v >= 0.0 && (*v as u32) < BRIEF_PATCH_DIAMETER)
        {
            pairs.push(TestPair {
                p0: Point::new(x0 as u32, y0 as u32),
                p1: Point::new(x1 as u32, y1 as u32),
            });
        }
    }

    Ok(pairs)
}

/// 相互最近傍となるペア数
pub fn cross_check_matches<T: BinaryDescriptor>(first: &[T], second: &[T]) -> usize {
    let backward: Vec<Option<usize>> = second.iter().map(|d| nearest(d, first)).collect();

    first
        .iter()
        .enumerate()
        .filter(|(i, d)| match nearest(*d, second) {
            Some(j) => backward[j] == Some(*i),
            None => false,
        })
        .count()
}

fn nearest<T: BinaryDescriptor>(query: &T, candidates: &[T]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| query.hamming_distance(c))
        .map(|(i, _)| i)
}
