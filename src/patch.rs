//! Recolouring and hiding of avatar body parts shipped inside a wearable.

use crate::data_structures::{
    colour::parse_hex_colour,
    material::{MaterialId, MaterialRole},
    scene_graph::Scene,
};

/// Applies the skin and hair colours to the given materials.
///
/// A material with a role gets the matching colour as albedo, or, without
/// one, is made fully transparent and removed from the scene's active
/// materials. Materials without either role are left untouched.
///
/// Empty colour strings count as absent. Both colours are validated before
/// anything is changed.
pub fn patch_materials(
    scene: &mut Scene,
    materials: &[MaterialId],
    skin: Option<&str>,
    hair: Option<&str>,
) -> anyhow::Result<()> {
    let skin = non_blank(skin).map(parse_hex_colour).transpose()?;
    let hair = non_blank(hair).map(parse_hex_colour).transpose()?;

    for &id in materials {
        for (role, colour) in [(MaterialRole::Hair, hair), (MaterialRole::Skin, skin)] {
            if !scene.material(id).has_role(role) {
                continue;
            }
            match colour {
                Some(colour) => {
                    log::debug!("Recolouring {} material {:?}", role, scene.material(id).name);
                    scene.material_mut(id).albedo = colour;
                }
                None => {
                    log::debug!("Hiding {} material {:?}", role, scene.material(id).name);
                    scene.material_mut(id).alpha = 0.0;
                    scene.remove_material(id);
                }
            }
        }
    }
    Ok(())
}

fn non_blank(colour: Option<&str>) -> Option<&str> {
    colour.filter(|c| !c.trim().is_empty())
}
