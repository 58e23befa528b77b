use wgpu::{BindGroupEntry, BindGroupLayoutEntry, BindingResource, BindingType, ShaderStages};

/// Builds a bind group and its layout in one go, so the two can't drift apart.
pub struct BindGroupBuilder<'a> {
    label: &'a str,
    visibility: ShaderStages,
    layout_entries: Vec<BindGroupLayoutEntry>,
    entries: Vec<BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(label: &'a str, visibility: ShaderStages) -> Self {
        Self {
            label,
            visibility,
            layout_entries: Vec::new(),
            entries: Vec::new(),
        }
    }

    fn entry(mut self, binding: u32, ty: BindingType, resource: BindingResource<'a>) -> Self {
        self.layout_entries.push(BindGroupLayoutEntry {
            binding,
            visibility: self.visibility,
            ty,
            count: None,
        });
        self.entries.push(BindGroupEntry { binding, resource });
        self
    }

    pub fn uniform(self, binding: u32, resource: BindingResource<'a>) -> Self {
        self.entry(
            binding,
            BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            resource,
        )
    }

    pub fn texture(self, binding: u32, view: &'a wgpu::TextureView) -> Self {
        self.entry(
            binding,
            BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingResource::TextureView(view),
        )
    }

    pub fn sampler(self, binding: u32, sampler: &'a wgpu::Sampler) -> Self {
        self.entry(
            binding,
            BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            BindingResource::Sampler(sampler),
        )
    }

    pub fn build(self, device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let layout_label = format!("{} bind group layout", self.label);
        let group_label = format!("{} bind group", self.label);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&layout_label),
            entries: &self.layout_entries,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&group_label),
            layout: &layout,
            entries: &self.entries,
        });

        (layout, bind_group)
    }
}
