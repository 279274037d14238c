//! 退化ケースに安全なベクトル演算

use nalgebra::Vector3;

/// ノルムがこれ未満のベクトルは方向が未定義とみなす
pub const EPSILON: f32 = 1e-6;

/// ベクトルを正規化し、(単位ベクトル, 元のノルム) を返す
///
/// ノルムが [`EPSILON`] 未満の場合はゼロベクトルとノルム0を返す。
/// 呼び出し側はゼロベクトルを「方向未定義」として扱うこと。
pub fn normalize(v: &Vector3<f32>) -> (Vector3<f32>, f32) {
    let norm = v.norm();
    if norm < EPSILON {
        return (Vector3::zeros(), 0.0);
    }
    (v / norm, norm)
}

/// 2ベクトル間の角度（度）
///
/// どちらかのノルムが小さすぎる場合は0を返す（エラーではない）。
pub fn angle_between(v1: &Vector3<f32>, v2: &Vector3<f32>) -> f32 {
    let denom = v1.norm() * v2.norm();
    if denom < EPSILON {
        return 0.0;
    }
    let cos_theta = (v1.dot(v2) / denom).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// 2点間のユークリッド距離
pub fn distance(p1: &Vector3<f32>, p2: &Vector3<f32>) -> f32 {
    (p1 - p2).norm()
}

/// 2点の中点
pub fn midpoint(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    (a + b) / 2.0
}

/// 距離由来の分母に下限を設ける
pub fn floor_denominator(value: f32) -> f32 {
    value.max(EPSILON)
}
