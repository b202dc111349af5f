//! Conversions between stored users and their wire shapes.

use crate::db::{NewUser, User};
use debez_schema::{CreateUserDto, UpdateUserDto, UserDto};

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            last_name: user.last_name,
            role: user.role,
        }
    }
}

impl From<CreateUserDto> for NewUser {
    fn from(dto: CreateUserDto) -> Self {
        Self {
            email: dto.email,
            name: dto.name,
            last_name: dto.last_name,
            role: dto.role,
        }
    }
}

impl From<UpdateUserDto> for User {
    fn from(dto: UpdateUserDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            name: dto.name,
            last_name: dto.last_name,
            role: dto.role,
        }
    }
}
