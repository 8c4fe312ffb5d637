use super::bridge::LoadRequest;

#[derive(Debug)]
pub enum Effect {
    LoadUnit(LoadRequest),
    LoadSourceListing { program_id: String, location: String },
}
