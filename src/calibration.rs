use anyhow::{bail, Context, Result};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// --- データ構造 ---

/// 外部パラメータファイルの形式 (extrinsics.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicsData {
    /// 回転行列 R (row-major 3x3)
    #[serde(rename = "R")]
    pub r: [[f32; 3]; 3],
    /// 並進ベクトル t
    pub t: [f32; 3],
}

/// カメラ座標 → 基準座標の外部パラメータ
///
/// プロセス起動時に一度読み込み、以降は読み取り専用で共有する。
/// R の逆行列は構築時に一度だけ計算する。
#[derive(Debug, Clone, PartialEq)]
pub struct Extrinsics {
    rotation: Matrix3<f32>,
    rotation_inv: Matrix3<f32>,
    translation: Vector3<f32>,
}

impl Extrinsics {
    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Result<Self> {
        let Some(rotation_inv) = rotation.try_inverse() else {
            bail!("Extrinsic rotation matrix is singular");
        };
        Ok(Self {
            rotation,
            rotation_inv,
            translation,
        })
    }

    /// 単位回転・並進ゼロ
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            rotation_inv: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn from_data(data: &ExtrinsicsData) -> Result<Self> {
        // row-major → nalgebra
        let r = &data.r;
        let rotation = Matrix3::new(
            r[0][0], r[0][1], r[0][2],
            r[1][0], r[1][1], r[1][2],
            r[2][0], r[2][1], r[2][2],
        );
        let translation = Vector3::new(data.t[0], data.t[1], data.t[2]);
        Self::new(rotation, translation)
    }

    pub fn to_data(&self) -> ExtrinsicsData {
        let m = &self.rotation;
        ExtrinsicsData {
            r: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            t: [self.translation.x, self.translation.y, self.translation.z],
        }
    }

    pub fn rotation(&self) -> &Matrix3<f32> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f32> {
        &self.translation
    }

    /// カメラ座標の点を基準座標系へ戻す: R⁻¹ (p − t)
    pub fn to_reference(&self, p: &Vector3<f32>) -> Vector3<f32> {
        self.rotation_inv * (p - self.translation)
    }
}

// --- Save / Load ---

pub fn save_extrinsics<P: AsRef<Path>>(path: P, extrinsics: &Extrinsics) -> Result<()> {
    let json = serde_json::to_string_pretty(&extrinsics.to_data())?;
    fs::write(path, json).context("Failed to write extrinsics file")?;
    Ok(())
}

pub fn load_extrinsics<P: AsRef<Path>>(path: P) -> Result<Extrinsics> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read extrinsics file: {}", path.display()))?;
    let data: ExtrinsicsData =
        serde_json::from_str(&content).context("Failed to parse extrinsics JSON")?;
    Extrinsics::from_data(&data)
}
