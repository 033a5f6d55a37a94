use std::fmt;
use ash::vk;
use serde::{Serialize, Serializer};
use crate::refl::TypeTag;
use super::ShaderInterface;

/// Absent bindings, offsets and sizes are written as -1.
pub(super) fn sentinel<T, S>(x: &Option<T>, s: S) -> Result<S::Ok, S::Error>
    where T: Serialize, S: Serializer
{
    match x {
        Some(x) => x.serialize(s),
        None => s.serialize_i64(-1),
    }
}
pub(super) fn stage_flags<S: Serializer>(x: &vk::ShaderStageFlags, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u32(x.as_raw())
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Renders the interface as a JSON document with `attributes`, `uniforms`,
/// `uniformBlocks` and `constants` objects keyed by symbol name.
impl fmt::Display for ShaderInterface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(self)
            .map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}


#[cfg(test)]
mod test {
    use super::{*};
    use serde_json::{json, Value};
    use crate::refl::{StageKind, StorageQualifier, TypeDesc};

    fn render(iface: &ShaderInterface) -> Value {
        serde_json::from_str(&iface.to_string()).unwrap()
    }

    #[test]
    fn test_render_empty() {
        let out = render(&ShaderInterface::new());
        assert_eq!(out, json!({
            "attributes": {},
            "uniforms": {},
            "uniformBlocks": {},
            "constants": {}
        }));
    }
    #[test]
    fn test_render_symbols() {
        let mut iface = ShaderInterface::new();
        iface.merge_attribute("inPosition", None, Some(0), &TypeDesc::vec(3));
        iface.merge_block("Matrices", Some(0), 64, StageKind::Vertex, StorageQualifier::Uniform, false);
        iface.merge_uniform("Matrices.mvp", None, Some(0), &TypeDesc::mat(4, 4), StageKind::Vertex, false, false);
        iface.merge_constant("nsample", Some(7), &TypeDesc::float(), StageKind::Fragment);
        let out = render(&iface);
        assert_eq!(out["attributes"]["inPosition"], json!({
            "set": -1, "location": 0, "size": 12, "type": "vec3"
        }));
        assert_eq!(out["uniformBlocks"]["Matrices"], json!({
            "binding": 0,
            "size": 64,
            "stageFlags": 1,
            "type": "uniform",
            "uniforms": {
                "mvp": {
                    "binding": -1,
                    "offset": 0,
                    "size": 64,
                    "type": "mat4",
                    "readOnly": false,
                    "writeOnly": false,
                    "stageFlags": 1
                }
            }
        }));
        assert_eq!(out["constants"]["nsample"], json!({
            "binding": 7, "size": 4, "stageFlags": 16, "type": "float"
        }));
    }
    #[test]
    fn test_render_standalone_uniform() {
        let mut iface = ShaderInterface::new();
        let ty = TypeDesc::Opaque(crate::refl::OpaqueType::SampledImage);
        iface.merge_uniform("albedo", Some(1), None, &ty, StageKind::Fragment, true, false);
        let out = render(&iface);
        assert_eq!(out["uniforms"]["albedo"]["offset"], json!(-1));
        assert_eq!(out["uniforms"]["albedo"]["size"], json!(-1));
        assert_eq!(out["uniforms"]["albedo"]["type"], json!("sampler2D"));
        assert_eq!(out["uniforms"]["albedo"]["readOnly"], json!(true));
    }
    #[test]
    fn test_render_escape() {
        let mut iface = ShaderInterface::new();
        iface.merge_attribute("a\"b", None, None, &TypeDesc::float());
        assert!(iface.to_string().contains("\"a\\\"b\""));
        assert!(render(&iface)["attributes"].get("a\"b").is_some());
    }
}
