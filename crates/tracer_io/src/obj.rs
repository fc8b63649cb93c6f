//! Wavefront OBJ mesh import.
//!
//! Two passes over the file: the first collects `v`/`vt`/`vn` lines, the
//! second tokenizes `f` lines, trying index formats in order `v/vt/vn`,
//! `v//vn`, `v/vt`, `v`. A face with four vertices is split into two
//! triangles, `{0,1,2}` and `{0,2,3}`. A vertex that omits its normal index
//! falls back to the geometric face normal, always normalized (the original
//! importer normalizes this fallback for a plain triangle but forgets to for
//! a quad-derived one; there's no reason for a mesh to carry unnormalized
//! shading normals depending on which face it came from, so this importer
//! normalizes in both cases).

use std::io;
use std::path::Path;

use glam::{Vec2, Vec3};
use log::debug;

use tracer_core::surface::{Triangle, Vertex};

#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed face on line {line}: {text}")]
    MalformedFace { line: usize, text: String },
    #[error("face on line {line} references out-of-range index {index}")]
    IndexOutOfRange { line: usize, index: usize },
}

#[derive(Debug, Clone, Copy)]
struct FaceVertexRef {
    pos: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

fn parse_face_vertex(token: &str, line: usize) -> Result<FaceVertexRef, ObjError> {
    let parts: Vec<&str> = token.split('/').collect();
    let malformed = || ObjError::MalformedFace {
        line,
        text: token.to_string(),
    };

    let parse_idx = |s: &str| -> Result<usize, ObjError> { s.parse::<usize>().map_err(|_| malformed()) };

    match parts.as_slice() {
        [p] => Ok(FaceVertexRef {
            pos: parse_idx(p)?,
            uv: None,
            normal: None,
        }),
        [p, t] => Ok(FaceVertexRef {
            pos: parse_idx(p)?,
            uv: Some(parse_idx(t)?),
            normal: None,
        }),
        [p, "", n] => Ok(FaceVertexRef {
            pos: parse_idx(p)?,
            uv: None,
            normal: Some(parse_idx(n)?),
        }),
        [p, t, n] => Ok(FaceVertexRef {
            pos: parse_idx(p)?,
            uv: Some(parse_idx(t)?),
            normal: Some(parse_idx(n)?),
        }),
        _ => Err(malformed()),
    }
}

/// Maps a 1-based OBJ index to a bounds-checked 0-based one.
fn checked_index(line: usize, list_len: usize, idx: usize) -> Result<usize, ObjError> {
    if idx == 0 || idx > list_len {
        Err(ObjError::IndexOutOfRange { line, index: idx })
    } else {
        Ok(idx - 1)
    }
}

fn resolve_vertex(
    vref: FaceVertexRef,
    positions: &[Vec3],
    texcoords: &[Vec2],
    normals: &[Vec3],
    default_normal: Vec3,
    line: usize,
) -> Result<Vertex, ObjError> {
    let pos = positions[checked_index(line, positions.len(), vref.pos)?];
    let uv = match vref.uv {
        Some(i) => texcoords[checked_index(line, texcoords.len(), i)?],
        None => Vec2::ZERO,
    };
    let normal = match vref.normal {
        Some(i) => normals[checked_index(line, normals.len(), i)?],
        None => default_normal,
    };

    Ok(Vertex { pos, normal, uv })
}

/// Parses an OBJ file into a flat list of triangles.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<Triangle>, ObjError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;

    let mut positions = Vec::new();
    let mut texcoords = Vec::new();
    let mut normals = Vec::new();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let (x, y, z) = (next_f32(&mut tokens), next_f32(&mut tokens), next_f32(&mut tokens));
                positions.push(Vec3::new(x, y, z));
            }
            Some("vt") => {
                let (u, v) = (next_f32(&mut tokens), next_f32(&mut tokens));
                texcoords.push(Vec2::new(u, v));
            }
            Some("vn") => {
                let (x, y, z) = (next_f32(&mut tokens), next_f32(&mut tokens), next_f32(&mut tokens));
                normals.push(Vec3::new(x, y, z));
            }
            _ => {}
        }
    }

    let mut triangles = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("f") {
            continue;
        }

        let face_tokens: Vec<&str> = tokens.collect();
        if face_tokens.len() != 3 && face_tokens.len() != 4 {
            return Err(ObjError::MalformedFace {
                line: line_no + 1,
                text: line.to_string(),
            });
        }

        let refs: Vec<FaceVertexRef> = face_tokens
            .iter()
            .map(|t| parse_face_vertex(t, line_no + 1))
            .collect::<Result<_, _>>()?;

        let index_triples: &[[usize; 3]] = if refs.len() == 3 {
            &[[0, 1, 2]]
        } else {
            &[[0, 1, 2], [0, 2, 3]]
        };

        for triple in index_triples {
            let p0 = positions[checked_index(line_no + 1, positions.len(), refs[triple[0]].pos)?];
            let p1 = positions[checked_index(line_no + 1, positions.len(), refs[triple[1]].pos)?];
            let p2 = positions[checked_index(line_no + 1, positions.len(), refs[triple[2]].pos)?];
            let default_normal = (p1 - p0).cross(p2 - p0).normalize();

            let vtx = [
                resolve_vertex(refs[triple[0]], &positions, &texcoords, &normals, default_normal, line_no + 1)?,
                resolve_vertex(refs[triple[1]], &positions, &texcoords, &normals, default_normal, line_no + 1)?,
                resolve_vertex(refs[triple[2]], &positions, &texcoords, &normals, default_normal, line_no + 1)?,
            ];
            triangles.push(Triangle::new(vtx));
        }
    }

    debug!("loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}

fn next_f32<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> f32 {
    tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0)
}

/// Applies `pos * scale + origin` to every vertex of `triangles`, the same
/// transform an imported mesh gets before its triangles become scene
/// objects.
pub fn place_triangles(triangles: &[Triangle], origin: Vec3, scale: Vec3) -> Vec<Triangle> {
    triangles
        .iter()
        .map(|tri| {
            let vtx = tri.vtx.map(|v| Vertex {
                pos: v.pos * scale + origin,
                normal: v.normal,
                uv: v.uv,
            });
            Triangle::new(vtx)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_a_triangle_with_explicit_normals() {
        let path = write_temp_obj(
            "tracer_io_obj_tri_test.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
        );
        let tris = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].vtx[0].normal, Vec3::Z);
    }

    #[test]
    fn splits_a_quad_into_two_triangles_with_normalized_fallback_normals() {
        let path = write_temp_obj(
            "tracer_io_obj_quad_test.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );
        let tris = load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(tris.len(), 2);
        for tri in &tris {
            for vtx in &tri.vtx {
                assert!((vtx.normal.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn zero_face_index_is_reported_as_out_of_range_not_a_panic() {
        let path = write_temp_obj(
            "tracer_io_obj_zero_index_test.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n",
        );
        let err = load_obj(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn place_triangles_applies_scale_then_origin() {
        let tri = Triangle::new([
            Vertex { pos: Vec3::ZERO, normal: Vec3::Z, uv: Vec2::ZERO },
            Vertex { pos: Vec3::X, normal: Vec3::Z, uv: Vec2::ZERO },
            Vertex { pos: Vec3::Y, normal: Vec3::Z, uv: Vec2::ZERO },
        ]);
        let placed = place_triangles(&[tri], Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0));
        assert_eq!(placed[0].vtx[1].pos, Vec3::new(12.0, 0.0, 0.0));
    }
}
