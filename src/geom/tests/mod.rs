mod test_mesh_sanity;
mod test_sampler_basic;
mod test_topology_basic;
