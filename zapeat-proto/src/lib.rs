pub mod common {
    tonic::include_proto!("zapeat.common");
}

pub mod restaurant_service {
    tonic::include_proto!("zapeat.restaurant_service");
}

pub mod order_service {
    tonic::include_proto!("zapeat.order_service");
}

pub mod auth_service {
    tonic::include_proto!("zapeat.auth_service");
}
